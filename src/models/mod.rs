pub mod agent;
pub mod lesson;
pub mod resource;

pub use agent::{AgentRequest, AgentResponse, AgentStatus, StatusResponse};
pub use lesson::{Challenge, CoreExample, Lesson, LessonRow, PitfallExample};
pub use resource::{LessonResource, NewLessonResource, Resource};
