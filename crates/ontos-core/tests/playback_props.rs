//! Property tests for the sequencer and typewriter.

use ontos_core::playback::{
    Jitter, PlaybackEvent, PlaybackStatus, Sequencer, TypingEvent, Typewriter, Wake,
};
use proptest::prelude::*;

fn offsets_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..500, 0..40).prop_map(|mut gaps| {
        let mut acc = 0;
        for g in &mut gaps {
            acc += *g;
            *g = acc;
        }
        gaps
    })
}

fn drive(seq: &mut Sequencer) {
    let mut next = seq.start();
    while let Some(w) = next {
        next = seq.fire(w);
    }
}

proptest! {
    #[test]
    fn revealed_count_visits_every_integer(offsets in offsets_strategy()) {
        let mut seq = Sequencer::single(offsets.as_slice());
        drive(&mut seq);

        let events = seq.drain_events();
        let advanced: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::Advanced(n) => Some(*n),
                _ => None,
            })
            .collect();
        let expected: Vec<usize> = (1..=offsets.len()).collect();
        prop_assert_eq!(advanced, expected);

        let completions = events.iter().filter(|e| **e == PlaybackEvent::Completed).count();
        prop_assert_eq!(completions, 1);
        prop_assert_eq!(events.last(), Some(&PlaybackEvent::Completed));
        prop_assert_eq!(seq.status(), PlaybackStatus::Complete);
        prop_assert_eq!(seq.revealed_count(), offsets.len());
    }

    #[test]
    fn total_wait_matches_last_offset(offsets in offsets_strategy()) {
        let mut seq = Sequencer::single(offsets.as_slice());
        let mut total = 0u128;
        let mut next = seq.start();
        while let Some(w) = next {
            total += w.after().as_millis();
            next = seq.fire(w);
        }
        let span = match (offsets.first(), offsets.last()) {
            (Some(a), Some(b)) => u128::from(b - a),
            _ => 0,
        };
        prop_assert_eq!(total, span);
    }

    #[test]
    fn cancel_silences_pending_wakes(offsets in offsets_strategy(), cut in 0usize..40) {
        let mut seq = Sequencer::single(offsets.as_slice());
        let mut pending: Vec<Wake> = Vec::new();
        let mut next = seq.start();
        let mut steps = 0;
        while let Some(w) = next {
            if steps == cut {
                pending.push(w);
                break;
            }
            next = seq.fire(w);
            steps += 1;
        }
        let before = seq.revealed_count();
        let was_complete = seq.is_complete();
        seq.drain_events();
        seq.cancel();

        for w in pending {
            prop_assert!(seq.fire(w).is_none());
        }
        prop_assert_eq!(seq.revealed_count(), before);
        prop_assert!(seq.drain_events().is_empty());
        prop_assert_eq!(seq.is_complete(), was_complete);
    }

    #[test]
    fn typing_reveals_every_prefix(text in "[a-z *\n🔥é]{0,60}", seed in any::<u64>()) {
        let mut tw = Typewriter::new(text.clone(), Jitter::with_seed(seed));
        let mut prefixes = Vec::new();
        let mut next = tw.start();
        while let Some(w) = next {
            next = tw.fire(w);
            prefixes.push(tw.revealed().to_string());
        }
        let expected: Vec<String> = text
            .char_indices()
            .map(|(i, c)| text[..i + c.len_utf8()].to_string())
            .collect();
        prop_assert_eq!(prefixes, expected);
        prop_assert!(tw.is_complete());
        prop_assert_eq!(tw.revealed(), text.as_str());

        let events = tw.drain_events();
        let completions = events.iter().filter(|e| **e == TypingEvent::Completed).count();
        prop_assert_eq!(completions, 1);
        prop_assert_eq!(events.last(), Some(&TypingEvent::Completed));
    }

    #[test]
    fn typing_cancel_freezes_prefix(text in "[a-z ]{1,40}", cut in 0usize..40) {
        let mut tw = Typewriter::new(text, Jitter::with_seed(5));
        let mut next = tw.start();
        for _ in 0..cut {
            match next {
                Some(w) => next = tw.fire(w),
                None => break,
            }
        }
        let held = next;
        let frozen = tw.revealed().to_string();
        tw.drain_events();
        tw.cancel();
        if let Some(w) = held {
            prop_assert!(tw.fire(w).is_none());
        }
        prop_assert_eq!(tw.revealed(), frozen.as_str());
        prop_assert!(tw.drain_events().is_empty());
    }
}
