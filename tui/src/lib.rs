pub mod app;
pub mod event;
pub mod ui;
pub mod config;

use crate::app::App;
use crate::event::{Event, EventHandler};
