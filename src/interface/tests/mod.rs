mod events;
mod executor;
mod udp;
mod virtual_network;
