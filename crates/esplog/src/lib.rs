// Domain-driven module structure for the ESP log parser.

// Core parsing engine
pub mod parser;

// Accumulated deployment record
pub mod deployment;

// Persistence / filesystem collaborators
pub mod store;

// Serial parse-job queue
pub mod job;

// Configuration and lookup tables
pub mod conf;

// Process bootstrap (logging, config)
pub mod runtime;
