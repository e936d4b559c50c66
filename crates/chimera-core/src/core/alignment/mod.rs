pub mod matchstate;
