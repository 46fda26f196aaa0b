pub mod agent_executor;
pub mod context;
pub mod memory;
pub mod outlet;
pub mod plan;
pub mod research;
pub mod review;
pub mod step_forward_agent;
pub mod workflow;
pub mod write;
