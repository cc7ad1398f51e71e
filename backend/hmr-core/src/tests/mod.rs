mod config;
mod dispatcher;
mod support;
