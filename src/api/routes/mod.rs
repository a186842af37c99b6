pub mod athletes;
pub mod calc;
pub mod health;
pub mod performances;
pub mod rankings;
