use pointq::Point;

#[derive(Debug, PartialEq)]
pub enum Command {
    Stop,
    Goto(Point),
    Invalid,
}

/// Parse one line of user input: either `stop`, or a destination written as
/// two numbers separated by whitespace or a comma.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.eq_ignore_ascii_case("stop") {
        return Command::Stop;
    }

    let mut coords = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>);

    match (coords.next(), coords.next(), coords.next()) {
        (Some(Ok(x)), Some(Ok(y)), None) if x.is_finite() && y.is_finite() => {
            Command::Goto(Point::new(x, y))
        }
        _ => Command::Invalid,
    }
}
