use microdude_protocol::codec::{get_parameter_request, set_sequence_fragment_request};
use microdude_protocol::{Parameter, Sequence, SequenceCounter, SequenceText, Step};
use proptest::prelude::*;

fn step_token() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u8..=126).prop_map(|note| note.to_string()),
        Just("x".to_string()),
    ]
}

fn sequence_line() -> impl Strategy<Value = String> {
    (1u8..=8, prop::collection::vec(step_token(), 1..=64))
        .prop_map(|(id, tokens)| format!("{}:{}", id, tokens.join(" ")))
}

proptest! {
    #[test]
    fn counter_returns_after_128_advances(start in 0u8..128) {
        let mut counter = SequenceCounter::new(start);
        for _ in 0..128 {
            counter.advance();
        }
        prop_assert_eq!(counter, SequenceCounter::new(start));
    }

    #[test]
    fn counter_stays_seven_bit(start in 0u8..128, steps in 0usize..400) {
        let mut counter = SequenceCounter::new(start);
        for _ in 0..steps {
            counter.advance();
        }
        prop_assert!(counter.value() <= 0x7F);
        prop_assert_eq!(usize::from(counter.value()), (usize::from(start) + steps) % 128);
    }

    #[test]
    fn sequence_text_round_trips(line in sequence_line()) {
        let text = SequenceText::parse(&line).unwrap();
        prop_assert_eq!(text.to_string(), line.clone());
        prop_assert_eq!(text.into_sequence().to_text(), line);
    }

    #[test]
    fn fragments_cover_every_step(line in sequence_line()) {
        let text = SequenceText::parse(&line).unwrap();
        let total: usize = text.fragments().map(|(_, steps)| steps.len()).sum();
        prop_assert_eq!(total, text.steps().len());
        prop_assert!(text.fragments().count() <= 2);
    }

    #[test]
    fn fragment_payload_is_fixed_size(line in sequence_line(), counter in 0u8..128) {
        let text = SequenceText::parse(&line).unwrap();
        for (offset, steps) in text.fragments() {
            let message =
                set_sequence_fragment_request(SequenceCounter::new(counter), text.id(), offset, steps);
            let payload = message.sysex_payload().unwrap();
            prop_assert_eq!(payload.len(), 11 + 32);
            prop_assert_eq!(payload[10] as usize, steps.len());
            prop_assert!(payload.iter().all(|b| *b <= 0x7F));
        }
    }

    #[test]
    fn rest_truncates_rendering(
        notes in prop::collection::vec(1u8..=126, 1..64),
        cut in 0usize..64,
    ) {
        let cut = cut % notes.len();
        let mut bytes = notes.clone();
        bytes[cut] = 0;
        let sequence = Sequence::from_wire(0, &bytes);

        prop_assert_eq!(sequence.played_steps().len(), cut);
        let expected: Vec<String> = notes[..cut].iter().map(|n| n.to_string()).collect();
        prop_assert_eq!(sequence.to_text(), format!("1:{}", expected.join(" ")));
    }

    #[test]
    fn parameter_request_is_pure(counter in 0u8..128, index in 0usize..14) {
        let parameter = Parameter::ALL[index];
        let counter = SequenceCounter::new(counter);
        prop_assert_eq!(
            get_parameter_request(counter, parameter),
            get_parameter_request(counter, parameter)
        );
    }

    #[test]
    fn wire_step_mapping_is_consistent(byte in 0u8..128) {
        prop_assert_eq!(Step::from_wire(byte).to_wire(), byte);
    }
}
