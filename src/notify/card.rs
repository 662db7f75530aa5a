use serde_json::{Value, json};

use crate::notify::notifier::Notification;

// ============================================================================
// Lark interactive card
// ============================================================================

pub const TITLE_SUCCESS: &str = "测试完成";
pub const TITLE_FAILURE: &str = "测试失败";

const HEADER_CASE: &str = "用例名";
const HEADER_PATH: &str = "接口路径";
const HEADER_REASON: &str = "错误原因";
const BUTTON_LABEL: &str = "测试报告";
const MENTION_ALL: &str = "<at id=all></at>";

/// Build the webhook body for a notification.
///
/// Layout, top to bottom:
/// - the headline message
/// - on failure, a header row and one grey row per failing case
///   (case name, endpoint path, error text)
/// - one button per report link
/// - on failure, an `@all` mention
pub fn build_card(notification: &Notification<'_>) -> Value {
    let mut elements = vec![plain_div(&notification.message)];

    if !notification.is_success {
        elements.push(column_set(
            "default",
            [HEADER_CASE, HEADER_PATH, HEADER_REASON],
        ));
        for (case_name, record) in notification.failures.iter() {
            elements.push(column_set(
                "grey",
                [case_name, &record.endpoint_path, &record.error_text],
            ));
        }
    }

    elements.push(json!({
        "tag": "action",
        "actions": report_buttons(notification.report_urls),
    }));

    let (title, template) = if notification.is_success {
        (TITLE_SUCCESS, "blue")
    } else {
        elements.push(json!({
            "tag": "div",
            "text": { "content": MENTION_ALL, "tag": "lark_md" },
        }));
        (TITLE_FAILURE, "red")
    };

    json!({
        "msg_type": "interactive",
        "card": {
            "header": {
                "title": { "content": title, "tag": "plain_text" },
                "template": template,
            },
            "elements": elements,
        },
    })
}

/// Buttons are numbered only when there is more than one link. With no links
/// a single button with an empty URL is still emitted.
fn report_buttons(urls: &[String]) -> Vec<Value> {
    let empty = [String::new()];
    let urls = if urls.is_empty() { &empty[..] } else { urls };
    let numbered = urls.len() > 1;
    urls.iter()
        .enumerate()
        .map(|(i, url)| {
            let label = if numbered {
                format!("{}{}", BUTTON_LABEL, i + 1)
            } else {
                BUTTON_LABEL.to_string()
            };
            json!({
                "tag": "button",
                "text": { "tag": "plain_text", "content": label },
                "url": url,
                "type": "primary",
            })
        })
        .collect()
}

fn plain_div(content: &str) -> Value {
    json!({
        "tag": "div",
        "text": { "content": content, "tag": "plain_text" },
    })
}

/// Three weighted columns (1, 1, 2): case name, path, reason.
fn column_set(background: &str, cells: [&str; 3]) -> Value {
    let [case_name, path, reason] = cells;
    json!({
        "tag": "column_set",
        "flex_mode": "none",
        "background_style": background,
        "columns": [
            column(1, "center", case_name),
            column(1, "center", path),
            column(2, "top", reason),
        ],
        "horizontal_spacing": "default",
    })
}

fn column(weight: u32, vertical_align: &str, content: &str) -> Value {
    json!({
        "tag": "column",
        "width": "weighted",
        "weight": weight,
        "vertical_align": vertical_align,
        "elements": [plain_div(content)],
    })
}
