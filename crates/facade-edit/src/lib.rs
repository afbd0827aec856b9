pub mod command;
pub mod config;
pub mod context;
pub mod create;
pub mod draw;
pub mod input;
pub mod manipulator;
pub mod movement;
pub mod navigate;
pub mod session;

pub use command::{CommandHistory, EditCommand, VertexMove};
pub use config::ToolConfig;
pub use context::ToolContext;
pub use draw::{Color, DrawList, DrawPrimitive};
pub use input::{EventQueue, InputEvent, Key, ModifierKey, Modifiers, MouseButton, PointerEvent};
pub use manipulator::{EditMode, EventOutcome, GestureKind};
pub use movement::{MoveState, PreviewFace};
pub use navigate::NavigationConfig;
pub use session::{replay, ReplayReport, Session};
