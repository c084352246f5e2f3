pub mod dimensional;
