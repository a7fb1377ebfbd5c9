pub mod ports;
pub mod relay_use_case;
