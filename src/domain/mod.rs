pub mod unsubscribe;
