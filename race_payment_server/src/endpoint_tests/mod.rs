mod bank;
mod guard;
mod helpers;
