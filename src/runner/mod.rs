pub mod apifox;
pub mod error;
pub mod harvest;
pub mod runner_model;
