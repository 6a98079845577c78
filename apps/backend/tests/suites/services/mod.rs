mod concurrency;
mod match_flow;
mod realtime;
