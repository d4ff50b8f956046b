pub mod cyclist_repository;
pub mod rental_repository;

// パブリックに型を再エクスポート
pub use cyclist_repository::CyclistRepository as PostgresCyclistRepository;
pub use rental_repository::RentalRepository as PostgresRentalRepository;
