use crate::error::AvdeccError;
use crate::model::*;
use crate::protocol::defines::DescriptorType;

fn sample_configuration() -> ConfigurationTree {
    let mut config = ConfigurationTree::new("Default");
    config.stream_inputs.push(StreamDescriptor::default());
    config.stream_inputs.push(StreamDescriptor::default());
    config.audio_units.push(AudioUnitDescriptor {
        current_sampling_rate: SamplingRate::from_hz(48_000),
        sampling_rates: vec![SamplingRate::from_hz(48_000), SamplingRate::from_hz(96_000)],
        ..AudioUnitDescriptor::default()
    });
    config
}

#[test]
fn test_empty_tree_is_invalid() {
    let tree = EntityTree::default();
    assert!(matches!(
        tree.validate(),
        Err(AvdeccError::InvalidEntityModel { .. })
    ));
}

#[test]
fn test_current_configuration_one_past_end_is_invalid() {
    let mut tree = EntityTree::with_configuration("Entity", sample_configuration());
    tree.current_configuration = 1;
    assert!(matches!(
        tree.validate(),
        Err(AvdeccError::InvalidEntityModel { .. })
    ));

    tree.current_configuration = 0;
    assert!(tree.validate().is_ok());
}

#[test]
fn test_descriptor_counts_skip_empty_types() {
    let counts = sample_configuration().descriptor_counts();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[&DescriptorType::STREAM_INPUT], 2);
    assert_eq!(counts[&DescriptorType::AUDIO_UNIT], 1);
}

#[test]
fn test_descriptor_lookup() {
    let tree = EntityTree::with_configuration("Entity", sample_configuration());

    let descriptor = tree
        .descriptor(0, DescriptorType::STREAM_INPUT, 1)
        .expect("stream input 1");
    assert_eq!(descriptor.descriptor_type(), DescriptorType::STREAM_INPUT);

    assert!(tree.descriptor(0, DescriptorType::STREAM_INPUT, 2).is_none());
    assert!(tree.descriptor(1, DescriptorType::STREAM_INPUT, 0).is_none());
    assert!(tree.descriptor(0, DescriptorType::CONTROL, 0).is_none());

    match tree.descriptor(0, DescriptorType::CONFIGURATION, 0) {
        Some(Descriptor::Configuration(config)) => {
            assert_eq!(config.object_name.to_string_lossy(), "Default");
            assert_eq!(config.descriptor_counts.len(), 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_sampling_rate_fields() {
    let rate = SamplingRate((1 << 29) | 44_100);
    assert_eq!(rate.pull(), 1);
    assert_eq!(rate.base_frequency(), 44_100);
    assert_eq!(SamplingRate::from_hz(48_000).to_string(), "48000 Hz");
}
