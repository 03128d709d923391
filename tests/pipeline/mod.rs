mod client;
mod health;
