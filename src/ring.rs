//! Producer/consumer index arithmetic shared by the Command queue and Event queue.
//!
//! Chapter 3. Operation, 3.5 Command and Event queues: each PROD/CONS register packs a `qs`-bit
//! slot index below a single wrap bit. The wrap bit is never folded into the slot value; it only
//! ever flips when the slot index wraps past the end of the queue. Keeping this arithmetic in one
//! place is what makes the full/empty predicate (the wrap-bit invariant) provable by inspection.

/// Extracts the slot component of a combined index, given `qs = log2(entries)`.
pub const fn slot(index: u32, qs: u32) -> u32 {
    index & ((1 << qs) - 1)
}

/// Extracts the wrap bit of a combined index as a bool.
pub const fn wrap(index: u32, qs: u32) -> bool {
    index & (1 << qs) != 0
}

/// Advances a combined index by one entry, toggling the wrap bit on overflow.
pub const fn advance(index: u32, qs: u32) -> u32 {
    let mask = (1 << qs) - 1;
    let next_slot = (slot(index, qs) + 1) & mask;
    let wrapped = if slot(index, qs) + 1 > mask {
        !wrap(index, qs)
    } else {
        wrap(index, qs)
    };
    (if wrapped { 1 << qs } else { 0 }) | next_slot
}

/// `empty ⟺ slot_p == slot_c ∧ wrap_p == wrap_c`.
pub const fn is_empty(prod: u32, cons: u32, qs: u32) -> bool {
    slot(prod, qs) == slot(cons, qs) && wrap(prod, qs) == wrap(cons, qs)
}

/// `full ⟺ slot_p == slot_c ∧ wrap_p ≠ wrap_c`.
pub const fn is_full(prod: u32, cons: u32, qs: u32) -> bool {
    slot(prod, qs) == slot(cons, qs) && wrap(prod, qs) != wrap(cons, qs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_state_holds() {
        let qs = 3; // 8-entry queue
        for prod in 0..(2 << qs) {
            for cons in 0..(2 << qs) {
                let empty = is_empty(prod, cons, qs);
                let full = is_full(prod, cons, qs);
                assert!(
                    empty ^ full || (!empty && !full),
                    "prod={prod} cons={cons}"
                );
                assert!(!(empty && full));
            }
        }
    }

    #[test]
    fn advance_wraps_slot_and_toggles_wrap_bit() {
        let qs = 2; // 4-entry queue
        let mut index = 0u32;
        for i in 1..=4 {
            index = advance(index, qs);
            assert_eq!(slot(index, qs), i % 4);
        }
        // After 4 advances from 0 we've wrapped exactly once.
        assert!(wrap(index, qs));
    }

    #[test]
    fn full_ring_wrap_has_exactly_one_toggle() {
        let qs = 4; // 16-entry queue
        let mut index = 0u32;
        let mut toggles = 0;
        let mut last_wrap = wrap(index, qs);
        for _ in 0..17 {
            index = advance(index, qs);
            let w = wrap(index, qs);
            if w != last_wrap {
                toggles += 1;
                last_wrap = w;
            }
        }
        assert_eq!(toggles, 1);
        assert_eq!(slot(index, qs), 1);
    }
}
