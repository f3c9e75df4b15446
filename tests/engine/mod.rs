mod fixtures;
mod rc_network;
mod steady_state;
