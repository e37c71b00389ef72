mod details;
mod dot;
mod model;
