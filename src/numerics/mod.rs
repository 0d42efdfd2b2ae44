pub mod simulator;
pub mod streamline;
pub mod timing;
