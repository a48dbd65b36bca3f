mod aecpdu;
mod descriptors;
mod payloads;
