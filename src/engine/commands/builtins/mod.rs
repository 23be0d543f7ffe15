pub mod assign;
pub mod cd;
pub mod exit;
pub mod status;
