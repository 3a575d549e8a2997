pub mod price_bar_repository;

pub use price_bar_repository::PriceBarRepository;
