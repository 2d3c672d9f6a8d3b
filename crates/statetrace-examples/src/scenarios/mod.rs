pub mod leaked_connections;
pub mod slow_requests;
pub mod stuck_worker;
