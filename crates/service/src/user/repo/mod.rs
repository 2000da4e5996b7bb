pub mod memory;
pub mod seaorm;

pub use memory::InMemoryUserRepository;
pub use seaorm::SeaOrmUserRepository;
