//! Entity model structures.
//!
//! Descriptors are carried as opaque data: the engine serializes and
//! deserializes them but does not interpret the relationships between them.
//! [`EntityTree`] holds the model a local entity answers READ_DESCRIPTOR
//! with.

pub mod descriptors;
pub mod tree;
pub mod types;

#[cfg(test)]
mod tests;

pub use descriptors::{
    AudioClusterDescriptor, AudioMapDescriptor, AudioUnitDescriptor, AvbInterfaceDescriptor,
    AvbInterfaceFlags, ClockDomainDescriptor, ClockSourceDescriptor, ClockSourceFlags,
    ConfigurationDescriptor, Descriptor, EntityDescriptor, JackDescriptor, JackFlags,
    LocaleDescriptor, MemoryObjectDescriptor, PortFlags, StreamDescriptor, StreamFlags,
    StreamPortDescriptor, StringsDescriptor,
};
pub use tree::{ConfigurationTree, EntityTree};
pub use types::{
    AsPath, AudioMapping, AvbInfo, AvbInfoFlags, ClockSourceIndex, ConfigurationIndex,
    DescriptorCounters, DescriptorIndex, DescriptorRange, LocalizedStringReference, MapIndex,
    MemoryObjectOperationType, MilanInfo, MilanInfoFeaturesFlags, MilanStreamInfo, MsrpMapping,
    OperationId, SamplingRate, StreamFormat, StreamIndex, StreamInfo, StreamInfoFlags,
    StreamInfoFlagsEx,
};
