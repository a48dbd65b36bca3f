//! Entity model tree of a local entity.
//!
//! Descriptor indices are positions in the per-type vectors, so a tree can
//! never contain index gaps.

use std::collections::BTreeMap;

use super::descriptors::{
    AudioClusterDescriptor, AudioMapDescriptor, AudioUnitDescriptor, AvbInterfaceDescriptor,
    ClockDomainDescriptor, ClockSourceDescriptor, ConfigurationDescriptor, Descriptor,
    JackDescriptor, LocaleDescriptor, MemoryObjectDescriptor, StreamDescriptor,
    StreamPortDescriptor, StringsDescriptor,
};
use super::types::{ConfigurationIndex, DescriptorIndex, LocalizedStringReference};
use crate::error::{AvdeccError, Result};
use crate::protocol::defines::DescriptorType;
use crate::types::AvdeccFixedString;

/// Descriptors of one configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigurationTree {
    /// Configuration name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// AUDIO_UNIT descriptors
    pub audio_units: Vec<AudioUnitDescriptor>,
    /// STREAM_INPUT descriptors
    pub stream_inputs: Vec<StreamDescriptor>,
    /// STREAM_OUTPUT descriptors
    pub stream_outputs: Vec<StreamDescriptor>,
    /// JACK_INPUT descriptors
    pub jack_inputs: Vec<JackDescriptor>,
    /// JACK_OUTPUT descriptors
    pub jack_outputs: Vec<JackDescriptor>,
    /// AVB_INTERFACE descriptors
    pub avb_interfaces: Vec<AvbInterfaceDescriptor>,
    /// CLOCK_SOURCE descriptors
    pub clock_sources: Vec<ClockSourceDescriptor>,
    /// MEMORY_OBJECT descriptors
    pub memory_objects: Vec<MemoryObjectDescriptor>,
    /// LOCALE descriptors
    pub locales: Vec<LocaleDescriptor>,
    /// STRINGS descriptors
    pub strings: Vec<StringsDescriptor>,
    /// STREAM_PORT_INPUT descriptors
    pub stream_port_inputs: Vec<StreamPortDescriptor>,
    /// STREAM_PORT_OUTPUT descriptors
    pub stream_port_outputs: Vec<StreamPortDescriptor>,
    /// AUDIO_CLUSTER descriptors
    pub audio_clusters: Vec<AudioClusterDescriptor>,
    /// AUDIO_MAP descriptors
    pub audio_maps: Vec<AudioMapDescriptor>,
    /// CLOCK_DOMAIN descriptors
    pub clock_domains: Vec<ClockDomainDescriptor>,
}

fn count(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}

fn pick<T: Clone>(
    list: &[T],
    index: DescriptorIndex,
    wrap: impl FnOnce(T) -> Descriptor,
) -> Option<Descriptor> {
    list.get(usize::from(index)).cloned().map(wrap)
}

impl ConfigurationTree {
    /// Empty configuration with the given name
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            object_name: AvdeccFixedString::new(name),
            ..Self::default()
        }
    }

    /// Number of top-level descriptors per type, empty types omitted
    #[must_use]
    pub fn descriptor_counts(&self) -> BTreeMap<DescriptorType, u16> {
        [
            (DescriptorType::AUDIO_UNIT, self.audio_units.len()),
            (DescriptorType::STREAM_INPUT, self.stream_inputs.len()),
            (DescriptorType::STREAM_OUTPUT, self.stream_outputs.len()),
            (DescriptorType::JACK_INPUT, self.jack_inputs.len()),
            (DescriptorType::JACK_OUTPUT, self.jack_outputs.len()),
            (DescriptorType::AVB_INTERFACE, self.avb_interfaces.len()),
            (DescriptorType::CLOCK_SOURCE, self.clock_sources.len()),
            (DescriptorType::MEMORY_OBJECT, self.memory_objects.len()),
            (DescriptorType::LOCALE, self.locales.len()),
            (DescriptorType::STRINGS, self.strings.len()),
            (DescriptorType::STREAM_PORT_INPUT, self.stream_port_inputs.len()),
            (DescriptorType::STREAM_PORT_OUTPUT, self.stream_port_outputs.len()),
            (DescriptorType::AUDIO_CLUSTER, self.audio_clusters.len()),
            (DescriptorType::AUDIO_MAP, self.audio_maps.len()),
            (DescriptorType::CLOCK_DOMAIN, self.clock_domains.len()),
        ]
        .into_iter()
        .filter(|(_, len)| *len > 0)
        .map(|(descriptor_type, len)| (descriptor_type, count(len)))
        .collect()
    }

    /// CONFIGURATION descriptor for this tree
    #[must_use]
    pub fn configuration_descriptor(&self) -> ConfigurationDescriptor {
        ConfigurationDescriptor {
            object_name: self.object_name,
            localized_description: self.localized_description,
            descriptor_counts: self.descriptor_counts(),
        }
    }

    /// Descriptor of the given type and index, CONFIGURATION and ENTITY excluded
    #[must_use]
    pub fn descriptor(
        &self,
        descriptor_type: DescriptorType,
        index: DescriptorIndex,
    ) -> Option<Descriptor> {
        match descriptor_type {
            DescriptorType::AUDIO_UNIT => pick(&self.audio_units, index, Descriptor::AudioUnit),
            DescriptorType::STREAM_INPUT => {
                pick(&self.stream_inputs, index, Descriptor::StreamInput)
            }
            DescriptorType::STREAM_OUTPUT => {
                pick(&self.stream_outputs, index, Descriptor::StreamOutput)
            }
            DescriptorType::JACK_INPUT => pick(&self.jack_inputs, index, Descriptor::JackInput),
            DescriptorType::JACK_OUTPUT => pick(&self.jack_outputs, index, Descriptor::JackOutput),
            DescriptorType::AVB_INTERFACE => {
                pick(&self.avb_interfaces, index, Descriptor::AvbInterface)
            }
            DescriptorType::CLOCK_SOURCE => {
                pick(&self.clock_sources, index, Descriptor::ClockSource)
            }
            DescriptorType::MEMORY_OBJECT => {
                pick(&self.memory_objects, index, Descriptor::MemoryObject)
            }
            DescriptorType::LOCALE => pick(&self.locales, index, Descriptor::Locale),
            DescriptorType::STRINGS => pick(&self.strings, index, Descriptor::Strings),
            DescriptorType::STREAM_PORT_INPUT => {
                pick(&self.stream_port_inputs, index, Descriptor::StreamPortInput)
            }
            DescriptorType::STREAM_PORT_OUTPUT => {
                pick(&self.stream_port_outputs, index, Descriptor::StreamPortOutput)
            }
            DescriptorType::AUDIO_CLUSTER => {
                pick(&self.audio_clusters, index, Descriptor::AudioCluster)
            }
            DescriptorType::AUDIO_MAP => pick(&self.audio_maps, index, Descriptor::AudioMap),
            DescriptorType::CLOCK_DOMAIN => {
                pick(&self.clock_domains, index, Descriptor::ClockDomain)
            }
            _ => None,
        }
    }
}

/// Entity model of a local entity
///
/// The ENTITY descriptor itself is not stored: it is synthesized from the
/// live entity information plus the static and dynamic fields kept here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityTree {
    /// Entity name
    pub entity_name: AvdeccFixedString,
    /// Group name
    pub group_name: AvdeccFixedString,
    /// Vendor name
    pub vendor_name_string: LocalizedStringReference,
    /// Model name
    pub model_name_string: LocalizedStringReference,
    /// Firmware version
    pub firmware_version: AvdeccFixedString,
    /// Serial number
    pub serial_number: AvdeccFixedString,
    /// Active configuration
    pub current_configuration: ConfigurationIndex,
    /// Configurations, indexed by position
    pub configurations: Vec<ConfigurationTree>,
}

impl EntityTree {
    /// Tree with a single configuration
    #[must_use]
    pub fn with_configuration(entity_name: &str, configuration: ConfigurationTree) -> Self {
        Self {
            entity_name: AvdeccFixedString::new(entity_name),
            configurations: vec![configuration],
            ..Self::default()
        }
    }

    /// Check the structural invariants a local entity relies on.
    ///
    /// # Errors
    ///
    /// [`AvdeccError::InvalidEntityModel`] when the tree has no configuration,
    /// when the current configuration is out of range, or when there are more
    /// configurations than a 16-bit index can address.
    pub fn validate(&self) -> Result<()> {
        if self.configurations.is_empty() {
            return Err(AvdeccError::InvalidEntityModel {
                reason: "at least one configuration descriptor is required".into(),
            });
        }
        if self.configurations.len() > usize::from(u16::MAX) {
            return Err(AvdeccError::InvalidEntityModel {
                reason: format!("{} configurations", self.configurations.len()),
            });
        }
        if usize::from(self.current_configuration) >= self.configurations.len() {
            return Err(AvdeccError::InvalidEntityModel {
                reason: format!(
                    "current configuration {} out of range (count {})",
                    self.current_configuration,
                    self.configurations.len()
                ),
            });
        }
        Ok(())
    }

    /// Number of configurations
    #[must_use]
    pub fn configurations_count(&self) -> u16 {
        count(self.configurations.len())
    }

    /// Configuration at `index`
    #[must_use]
    pub fn configuration(&self, index: ConfigurationIndex) -> Option<&ConfigurationTree> {
        self.configurations.get(usize::from(index))
    }

    /// Mutable configuration at `index`
    pub fn configuration_mut(&mut self, index: ConfigurationIndex) -> Option<&mut ConfigurationTree> {
        self.configurations.get_mut(usize::from(index))
    }

    /// Descriptor of `configuration`, the CONFIGURATION descriptor included.
    ///
    /// ENTITY is not resolved here.
    #[must_use]
    pub fn descriptor(
        &self,
        configuration: ConfigurationIndex,
        descriptor_type: DescriptorType,
        index: DescriptorIndex,
    ) -> Option<Descriptor> {
        if descriptor_type == DescriptorType::CONFIGURATION {
            return self
                .configuration(index)
                .map(|tree| Descriptor::Configuration(tree.configuration_descriptor()));
        }
        self.configuration(configuration)?
            .descriptor(descriptor_type, index)
    }
}
