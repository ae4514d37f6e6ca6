pub mod ranking;
pub mod record;
pub mod variant;
