use crate::engine::{Configuration, Move, Tube};
use crate::error::{Result, SolverError};

/// Capacity of every tube in `sample_puzzle`.
pub const SAMPLE_CAPACITY: usize = 4;

const SAMPLE_ROWS: [[u16; SAMPLE_CAPACITY]; 14] = [
    [4, 4, 10, 2],
    [8, 12, 8, 1],
    [9, 5, 7, 10],
    [5, 2, 3, 5],
    [7, 8, 11, 6],
    [2, 1, 12, 12],
    [11, 8, 7, 4],
    [1, 3, 11, 10],
    [9, 9, 7, 10],
    [11, 6, 2, 6],
    [3, 9, 6, 4],
    [1, 12, 3, 5],
    [0, 0, 0, 0],
    [0, 0, 0, 0],
];

/// Moves per line in `format_solution`.
const MOVES_PER_LINE: usize = 8;

/// Builds a configuration from raw slot arrays sharing one global `capacity`.
///
/// Each row lists one tube bottom to top. The value `0` marks "no unit at
/// this slot" and is stripped, so only real colours are pushed.
///
/// # Errors
/// * `SolverError::EmptyPuzzle` if `rows` is empty.
/// * `SolverError::ZeroCapacity` if `capacity` is 0.
/// * `SolverError::Overfilled` if a row holds more real units than `capacity`.
///
/// # Examples
/// ```
/// use water_sort_solver::utils::configuration_from_rows;
///
/// let configuration = configuration_from_rows(3, &[[1u16, 2, 2], [0, 0, 0]]).unwrap();
/// assert_eq!(configuration.len(), 2);
/// assert!(configuration.tube(1).unwrap().is_empty());
///
/// assert!(configuration_from_rows(2, &[[1u16, 1, 1]]).is_err());
/// ```
pub fn configuration_from_rows<R: AsRef<[u16]>>(
    capacity: usize,
    rows: &[R],
) -> Result<Configuration> {
    if rows.is_empty() {
        return Err(SolverError::EmptyPuzzle);
    }
    let tubes = rows
        .iter()
        .map(|row| Tube::from_raw(capacity, row.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(Configuration::new(tubes))
}

/// Parses a puzzle description, one tube per line.
///
/// Format:
/// - Tokens are colour ids separated by whitespace and/or commas.
/// - `0` or `.` marks an empty slot.
/// - Everything after `#` on a line is a comment; blank lines are skipped.
///
/// When `capacity` is `None`, every row must have the same number of tokens
/// and that width becomes the capacity.
///
/// # Errors
/// * `SolverError::Parse` for an unrecognized token or a row that overflows
///   its tube, with the 1-based line number.
/// * `SolverError::RaggedRows` if the capacity must be inferred and rows differ in width.
/// * `SolverError::EmptyPuzzle` if the text holds no rows.
/// * `SolverError::ZeroCapacity` if the capacity is 0.
pub fn parse_puzzle(text: &str, capacity: Option<usize>) -> Result<Configuration> {
    let mut rows: Vec<(usize, Vec<u16>)> = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line
            .find('#')
            .map_or(raw_line, |pos| &raw_line[..pos])
            .trim();
        if line.is_empty() {
            continue;
        }

        let mut row = Vec::new();
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let value = if token == "." {
                0
            } else {
                token.parse::<u16>().map_err(|_| SolverError::Parse {
                    line: line_number,
                    message: format!("unrecognized token '{}'", token),
                })?
            };
            row.push(value);
        }
        rows.push((line_number, row));
    }

    let Some((_, first_row)) = rows.first() else {
        return Err(SolverError::EmptyPuzzle);
    };

    let capacity = match capacity {
        Some(capacity) => capacity,
        None => {
            let first = first_row.len();
            if let Some((line, row)) = rows.iter().find(|(_, row)| row.len() != first) {
                return Err(SolverError::RaggedRows {
                    first,
                    other: row.len(),
                    line: *line,
                });
            }
            first
        }
    };
    if capacity == 0 {
        return Err(SolverError::ZeroCapacity);
    }

    let tubes = rows
        .iter()
        .map(|(line, row)| {
            Tube::from_raw(capacity, row).map_err(|err| SolverError::Parse {
                line: *line,
                message: err.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Configuration::new(tubes))
}

/// The built-in demonstration puzzle: 12 colours in 14 tubes of capacity 4,
/// two of them empty.
pub fn sample_puzzle() -> Result<Configuration> {
    configuration_from_rows(SAMPLE_CAPACITY, &SAMPLE_ROWS)
}

/// Renders moves as `(src -> dst)` entries, eight per line.
///
/// Every line, including the last, ends with a newline. An empty move list
/// renders as an empty string.
///
/// # Examples
/// ```
/// use water_sort_solver::engine::Move;
/// use water_sort_solver::utils::format_solution;
///
/// let text = format_solution(&[Move::new(0, 13, 1), Move::new(2, 0, 2)]);
/// assert_eq!(text, "( 0 -> 13) ( 2 ->  0)\n");
/// ```
pub fn format_solution(moves: &[Move]) -> String {
    moves
        .chunks(MOVES_PER_LINE)
        .map(|line| {
            let entries: Vec<String> = line
                .iter()
                .map(|mv| format!("({:2} -> {:2})", mv.source(), mv.destination()))
                .collect();
            format!("{}\n", entries.join(" "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Color;

    #[test]
    fn test_configuration_from_rows_strips_sentinels() {
        let configuration = configuration_from_rows(4, &[[1u16, 0, 2, 0], [0, 0, 0, 0]]).unwrap();
        assert_eq!(
            configuration.tube(0).unwrap().contents(),
            &[Color::new(1), Color::new(2)]
        );
        assert!(configuration.tube(1).unwrap().is_empty());
    }

    #[test]
    fn test_configuration_from_rows_errors() {
        let no_rows: [[u16; 2]; 0] = [];
        assert_eq!(
            configuration_from_rows(2, &no_rows),
            Err(SolverError::EmptyPuzzle)
        );
        assert_eq!(
            configuration_from_rows(0, &[[0u16]]),
            Err(SolverError::ZeroCapacity)
        );
        assert_eq!(
            configuration_from_rows(2, &[vec![1u16, 2, 3]]),
            Err(SolverError::Overfilled { len: 3, capacity: 2 })
        );
    }

    #[test]
    fn test_parse_puzzle_formats() {
        let text = "\
# two colours, one spare tube
1 2 1 2
2,1,2,1

. . . .   # spare
";
        let configuration = parse_puzzle(text, None).unwrap();
        assert_eq!(configuration.len(), 3);
        assert_eq!(configuration.tube(0).unwrap().capacity(), 4);
        assert_eq!(configuration.tube(1).unwrap().top_color(), Some(Color::new(1)));
        assert!(configuration.tube(2).unwrap().is_empty());
    }

    #[test]
    fn test_parse_puzzle_explicit_capacity_allows_short_rows() {
        let configuration = parse_puzzle("1 1\n2\n\n0", Some(3)).unwrap();
        assert_eq!(configuration.len(), 3);
        assert_eq!(configuration.tube(1).unwrap().len(), 1);
        assert_eq!(configuration.tube(1).unwrap().free_space(), 2);
    }

    #[test]
    fn test_parse_puzzle_errors() {
        assert_eq!(parse_puzzle("", None), Err(SolverError::EmptyPuzzle));
        assert_eq!(parse_puzzle("# nothing\n\n", None), Err(SolverError::EmptyPuzzle));

        match parse_puzzle("1 2\n3 x", None) {
            Err(SolverError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("'x'"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        assert_eq!(
            parse_puzzle("1 2\n3", None),
            Err(SolverError::RaggedRows {
                first: 2,
                other: 1,
                line: 2
            })
        );

        match parse_puzzle("1 1 1", Some(2)) {
            Err(SolverError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected overflow error, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_puzzle_shape() {
        let sample = sample_puzzle().unwrap();
        assert_eq!(sample.len(), 14);
        assert!(sample.is_balanced());
        assert_eq!(sample.color_counts().len(), 12);
        assert!(sample.color_counts().values().all(|&n| n == SAMPLE_CAPACITY));
        assert!(sample.tube(12).unwrap().is_empty());
    }

    #[test]
    fn test_format_solution_groups_by_eight() {
        assert_eq!(format_solution(&[]), "");

        let moves: Vec<Move> = (0..9).map(|i| Move::new(i, i + 1, 1)).collect();
        let text = format_solution(&moves);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].matches("->").count(), 8);
        assert_eq!(lines[1], "( 8 ->  9)");
        assert!(text.ends_with('\n'));
    }
}
