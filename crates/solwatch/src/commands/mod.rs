pub mod balance;
pub mod listen;
