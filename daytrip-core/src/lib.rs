pub mod attraction;
pub mod booking;
pub mod member;
pub mod order;
pub mod payment;
pub mod repository;
