mod config_dto;

pub use config_dto::{ConfigResponseDto, SettingsPatchDto, UpdateConfigDto, UpdateConfigResponseDto};
