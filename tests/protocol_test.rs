//! Record format and canvas behaviour, as seen by the wire.

use rstest::rstest;

use rplace_painter::canvas::{coord, Canvas, Cell, Shade, WHITE};
use rplace_painter::errors::{PlaceError, Result};

// ==================== Coordinate Codec ====================

#[test]
fn test_codec_round_trip() -> Result<()> {
    for n in 0..=i64::from(coord::MAX_COORD) {
        assert_eq!(i64::from(coord::decode(&coord::encode(n)?)?), n);
    }
    Ok(())
}

#[rstest]
#[case(-1)]
#[case(676)]
#[case(1_000_000)]
fn test_encode_out_of_range(#[case] n: i64) {
    assert!(matches!(coord::encode(n), Err(PlaceError::RangeError { .. })));
}

#[rstest]
#[case("A")]
#[case("ABC")]
#[case("A1")]
#[case("")]
#[case("a$")]
fn test_decode_malformed(#[case] input: &str) {
    assert!(matches!(coord::decode(input), Err(PlaceError::FormatError(_))));
}

// ==================== Cell ====================

#[rstest]
#[case(Cell::new(0, 0, 15, 15))]
#[case(Cell::half_block(12, 27, 0, 15))]
#[case(Cell::half_block(999, 675, 255, 0))]
fn test_cell_round_trip(#[case] cell: Cell) -> Result<()> {
    assert_eq!(Cell::parse(&cell.serialize()?)?, cell);
    Ok(())
}

// ==================== Canvas ====================

#[test]
fn test_fresh_canvas_snapshot() -> Result<()> {
    let snapshot = Canvas::new(4, 4)?.snapshot()?;
    assert_eq!(snapshot.len(), 16);
    for record in &snapshot {
        let cell = Cell::parse(record)?;
        assert_eq!(cell.bg(), WHITE);
        assert_eq!(cell.fg(), WHITE);
    }
    Ok(())
}

#[test]
fn test_apply_then_read() -> Result<()> {
    let mut canvas = Canvas::new(4, 4)?;
    let before = canvas.snapshot()?;

    let record = Cell::with_glyph(2, 1, 3, 7, 'x')?.serialize()?;
    assert_eq!(record, "2AB 3 7 x");
    canvas.apply(&record)?;

    let after = canvas.snapshot()?;
    assert_eq!(after[6], "2AB 3 7 x");
    for (i, (old, new)) in before.iter().zip(&after).enumerate() {
        if i != 6 {
            assert_eq!(old, new, "record {i} changed");
        }
    }
    Ok(())
}

#[rstest]
#[case("4AA 3 7 x")]
#[case("0AE 3 7 x")]
#[case("0ZZ 3 7 x")]
fn test_out_of_bounds_apply_leaves_grid(#[case] record: &str) -> Result<()> {
    let mut canvas = Canvas::new(4, 4)?;
    let before = canvas.clone();
    assert!(matches!(
        canvas.apply(record),
        Err(PlaceError::OutOfBoundsError { .. })
    ));
    assert_eq!(canvas, before);
    Ok(())
}

#[rstest]
#[case("garbage")]
#[case("2AB 3 7")]
#[case("2AB x 7 x")]
#[case("2A? 3 7 x")]
fn test_malformed_apply_leaves_grid(#[case] record: &str) -> Result<()> {
    let mut canvas = Canvas::new(4, 4)?;
    let before = canvas.clone();
    assert!(matches!(canvas.apply(record), Err(PlaceError::FormatError(_))));
    assert_eq!(canvas, before);
    Ok(())
}

#[test]
fn test_apply_is_idempotent() -> Result<()> {
    let mut once = Canvas::new(4, 4)?;
    once.apply("3AD 1 2 ▀")?;

    let mut twice = Canvas::new(4, 4)?;
    twice.apply("3AD 1 2 ▀")?;
    twice.apply("3AD 1 2 ▀")?;

    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn test_last_write_wins() -> Result<()> {
    let mut canvas = Canvas::new(2, 2)?;
    canvas.apply("1AB 1 2 ▀")?;
    canvas.apply("1AB 4 5 _")?;
    assert_eq!(canvas.get(1, 1), Some(&Cell::new(1, 1, 4, 5)));
    Ok(())
}

#[test]
fn test_shade_classification() -> Result<()> {
    let mut canvas = Canvas::new(2, 2)?;
    canvas.apply("1AA 15 3 ▀")?;
    canvas.apply("0AB 3 15 ▀")?;
    canvas.apply("1AB 3 3 ▀")?;

    let shades: Vec<Shade> = canvas.cells().iter().map(Shade::of).collect();
    assert_eq!(
        shades,
        vec![Shade::Lit, Shade::LowerLit, Shade::UpperLit, Shade::Unlit]
    );
    assert_eq!(canvas.render(), "█▄\n▀ \n");
    Ok(())
}
