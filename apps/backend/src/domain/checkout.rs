//! Checkout suggestions for a remaining score.
//!
//! Scores 2..=170 that can be finished in three darts come from a fixed chart
//! of standard finishes. Anything the chart lacks falls back to a brute-force
//! search over treble/treble/double and double/double paths. The search is
//! best-effort: it returns the first path it finds, not the path a
//! professional would pick.

use crate::domain::throws::{DartThrow, Ring, BULL_SEGMENT};

/// Highest score that can be checked out with three darts.
pub const MAX_CHECKOUT: u16 = 170;

/// Scores at or below 170 that have no three-dart finish.
pub const BOGEY_SCORES: [u16; 7] = [159, 162, 163, 165, 166, 168, 169];

type Dart = (u8, Ring);

const fn s(n: u8) -> Dart {
    (n, Ring::Single)
}
const fn d(n: u8) -> Dart {
    (n, Ring::Double)
}
const fn t(n: u8) -> Dart {
    (n, Ring::Triple)
}
const BULL: Dart = (BULL_SEGMENT, Ring::Double);
const OUTER_BULL: Dart = (BULL_SEGMENT, Ring::Single);

static CHECKOUT_TABLE: &[(u16, &[Dart])] = &[
    (170, &[t(20), t(20), BULL]),
    (167, &[t(20), t(19), BULL]),
    (164, &[t(20), t(18), BULL]),
    (161, &[t(20), t(17), BULL]),
    (160, &[t(20), t(20), d(20)]),
    (158, &[t(20), t(20), d(19)]),
    (157, &[t(20), t(19), d(20)]),
    (156, &[t(20), t(20), d(18)]),
    (155, &[t(20), t(19), d(19)]),
    (154, &[t(20), t(18), d(20)]),
    (153, &[t(20), t(19), d(18)]),
    (152, &[t(20), t(20), d(16)]),
    (151, &[t(20), t(17), d(20)]),
    (150, &[t(20), t(18), d(18)]),
    (149, &[t(20), t(19), d(16)]),
    (148, &[t(20), t(16), d(20)]),
    (147, &[t(20), t(17), d(18)]),
    (146, &[t(20), t(18), d(16)]),
    (145, &[t(20), t(15), d(20)]),
    (144, &[t(20), t(20), d(12)]),
    (143, &[t(20), t(17), d(16)]),
    (142, &[t(20), t(14), d(20)]),
    (141, &[t(20), t(19), d(12)]),
    (140, &[t(20), t(20), d(10)]),
    (139, &[t(20), t(13), d(20)]),
    (138, &[t(20), t(18), d(12)]),
    (137, &[t(20), t(19), d(10)]),
    (136, &[t(20), t(20), d(8)]),
    (135, &[t(20), t(17), d(12)]),
    (134, &[t(20), t(14), d(16)]),
    (133, &[t(20), t(19), d(8)]),
    (132, &[t(20), t(16), d(12)]),
    (131, &[t(20), t(13), d(16)]),
    (130, &[t(20), t(20), d(5)]),
    (129, &[t(19), t(16), d(12)]),
    (128, &[t(18), t(14), d(16)]),
    (127, &[t(20), t(17), d(8)]),
    (126, &[t(19), t(19), d(6)]),
    (125, &[OUTER_BULL, t(20), d(20)]),
    (124, &[t(20), t(16), d(8)]),
    (123, &[t(19), t(16), d(9)]),
    (122, &[t(18), t(18), d(7)]),
    (121, &[t(20), t(11), d(14)]),
    (120, &[t(20), s(20), d(20)]),
    (119, &[t(19), t(12), d(13)]),
    (118, &[t(20), s(18), d(20)]),
    (117, &[t(20), s(17), d(20)]),
    (116, &[t(20), s(16), d(20)]),
    (115, &[t(20), s(15), d(20)]),
    (114, &[t(20), s(14), d(20)]),
    (113, &[t(20), s(13), d(20)]),
    (112, &[t(20), t(12), d(8)]),
    (111, &[t(20), s(11), d(20)]),
    (110, &[t(20), BULL]),
    (109, &[t(20), s(9), d(20)]),
    (108, &[t(20), s(16), d(16)]),
    (107, &[t(19), BULL]),
    (106, &[t(20), s(6), d(20)]),
    (105, &[t(20), s(5), d(20)]),
    (104, &[t(18), BULL]),
    (103, &[t(19), s(6), d(20)]),
    (102, &[t(20), s(10), d(16)]),
    (101, &[t(17), BULL]),
    (100, &[t(20), d(20)]),
    (99, &[t(19), s(10), d(16)]),
    (98, &[t(20), d(19)]),
    (97, &[t(19), d(20)]),
    (96, &[t(20), d(18)]),
    (95, &[t(19), d(19)]),
    (94, &[t(18), d(20)]),
    (93, &[t(19), d(18)]),
    (92, &[t(20), d(16)]),
    (91, &[t(17), d(20)]),
    (90, &[t(20), d(15)]),
    (89, &[t(19), d(16)]),
    (88, &[t(16), d(20)]),
    (87, &[t(17), d(18)]),
    (86, &[t(18), d(16)]),
    (85, &[t(15), d(20)]),
    (84, &[t(20), d(12)]),
    (83, &[t(17), d(16)]),
    (82, &[BULL, d(16)]),
    (81, &[t(19), d(12)]),
    (80, &[t(20), d(10)]),
    (79, &[t(19), d(11)]),
    (78, &[t(18), d(12)]),
    (77, &[t(19), d(10)]),
    (76, &[t(20), d(8)]),
    (75, &[t(17), d(12)]),
    (74, &[t(14), d(16)]),
    (73, &[t(19), d(8)]),
    (72, &[t(16), d(12)]),
    (71, &[t(13), d(16)]),
    (70, &[t(18), d(8)]),
    (69, &[t(19), d(6)]),
    (68, &[t(20), d(4)]),
    (67, &[t(17), d(8)]),
    (66, &[t(10), d(18)]),
    (65, &[t(19), d(4)]),
    (64, &[t(16), d(8)]),
    (63, &[t(13), d(12)]),
    (62, &[t(10), d(16)]),
    (61, &[t(15), d(8)]),
    (60, &[s(20), d(20)]),
    (59, &[s(19), d(20)]),
    (58, &[s(18), d(20)]),
    (57, &[s(17), d(20)]),
    (56, &[s(16), d(20)]),
    (55, &[s(15), d(20)]),
    (54, &[s(14), d(20)]),
    (53, &[s(13), d(20)]),
    (52, &[s(12), d(20)]),
    (51, &[s(11), d(20)]),
    (50, &[BULL]),
    (49, &[s(9), d(20)]),
    (48, &[s(16), d(16)]),
    (47, &[s(15), d(16)]),
    (46, &[s(6), d(20)]),
    (45, &[s(13), d(16)]),
    (44, &[s(12), d(16)]),
    (43, &[s(3), d(20)]),
    (42, &[s(10), d(16)]),
    (41, &[s(9), d(16)]),
    (40, &[d(20)]),
    (39, &[s(7), d(16)]),
    (38, &[d(19)]),
    (37, &[s(5), d(16)]),
    (36, &[d(18)]),
    (35, &[s(3), d(16)]),
    (34, &[d(17)]),
    (33, &[s(1), d(16)]),
    (32, &[d(16)]),
    (31, &[s(15), d(8)]),
    (30, &[d(15)]),
    (29, &[s(13), d(8)]),
    (28, &[d(14)]),
    (27, &[s(11), d(8)]),
    (26, &[d(13)]),
    (25, &[s(9), d(8)]),
    (24, &[d(12)]),
    (23, &[s(7), d(8)]),
    (22, &[d(11)]),
    (21, &[s(5), d(8)]),
    (20, &[d(10)]),
    (19, &[s(3), d(8)]),
    (18, &[d(9)]),
    (17, &[s(1), d(8)]),
    (16, &[d(8)]),
    (15, &[s(7), d(4)]),
    (14, &[d(7)]),
    (13, &[s(5), d(4)]),
    (12, &[d(6)]),
    (11, &[s(3), d(4)]),
    (10, &[d(5)]),
    (9, &[s(1), d(4)]),
    (8, &[d(4)]),
    (7, &[s(3), d(2)]),
    (6, &[d(3)]),
    (5, &[s(1), d(2)]),
    (4, &[d(2)]),
    (3, &[s(1), d(1)]),
    (2, &[d(1)]),
];

pub fn is_bogey(remaining: u16) -> bool {
    BOGEY_SCORES.contains(&remaining)
}

/// Suggested finishing darts for `remaining`, or empty when no finish exists.
pub fn suggest_checkout(remaining: u16) -> Vec<DartThrow> {
    if !(2..=MAX_CHECKOUT).contains(&remaining) || is_bogey(remaining) {
        return Vec::new();
    }

    let charted = CHECKOUT_TABLE
        .iter()
        .find(|(score, _)| *score == remaining)
        .and_then(|(_, darts)| {
            darts
                .iter()
                .map(|&(segment, ring)| DartThrow::new(segment, ring).ok())
                .collect::<Option<Vec<_>>>()
        });

    charted.unwrap_or_else(|| search_checkout(remaining))
}

/// Brute-force fallback: first treble/treble/double path, then double/double.
pub fn search_checkout(remaining: u16) -> Vec<DartThrow> {
    let trebles: Vec<DartThrow> = (1..=20)
        .rev()
        .filter_map(|n| DartThrow::new(n, Ring::Triple).ok())
        .collect();
    let doubles: Vec<DartThrow> = std::iter::once(BULL_SEGMENT)
        .chain((1..=20).rev())
        .filter_map(|n| DartThrow::new(n, Ring::Double).ok())
        .collect();

    for first in &trebles {
        for second in &trebles {
            for last in &doubles {
                if first.score() + second.score() + last.score() == remaining {
                    return vec![*first, *second, *last];
                }
            }
        }
    }

    for first in &doubles {
        for last in &doubles {
            if first.score() + last.score() == remaining {
                return vec![*first, *last];
            }
        }
    }

    Vec::new()
}

/// Labels of the suggested path, e.g. `["T20", "T20", "Bull"]`.
pub fn checkout_labels(remaining: u16) -> Vec<String> {
    suggest_checkout(remaining)
        .iter()
        .map(DartThrow::label)
        .collect()
}
