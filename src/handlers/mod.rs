pub mod env;
pub mod run;
pub mod show;
