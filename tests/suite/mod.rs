mod console_fend;
mod sessions;
mod settings;
