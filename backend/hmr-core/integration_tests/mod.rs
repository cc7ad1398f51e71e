mod helpers;
mod hot_reload;
mod registration;
