mod controls;
mod details;
mod fps;
mod for_you;
mod panels;
