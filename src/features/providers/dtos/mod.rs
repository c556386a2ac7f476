mod provider_dto;

pub use provider_dto::{
    BrowseQuery, ConnectionTestResponseDto, CreateProviderDto, ProviderListResponseDto,
    ProviderResponseDto, UpdateProviderDto,
};
