pub mod commands;
pub mod hexdump;
pub mod telemetry;
