use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{self, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{BorderType, Borders, List, Wrap};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    symbols::border,
    text::{Line, Text},
    widgets::{Block, Paragraph, Widget},
};

use royal_ur::games::ur::{Dice, GameEngine, Phase, Player, Seat};

pub struct GameView<'a, D> {
    pub engine: &'a GameEngine<D>,
    pub log: &'a [String],
    pub status: Option<&'a str>,
}

fn seat_color(seat: Seat) -> style::Color {
    match seat {
        Seat::One => style::Color::Blue,
        Seat::Two => style::Color::Red,
    }
}

// One board cell, four columns wide
fn cell_span<D: Dice>(engine: &GameEngine<D>, index: usize) -> Span<'static> {
    let rosette = engine.cell_at(index).map(|c| c.is_rosette()).unwrap_or(false);

    match engine.occupancy_at(index) {
        Ok(Some(token)) => Span::styled(
            format!("[{:2}]", token.id()),
            Style::default().fg(seat_color(token.seat())).add_modifier(Modifier::BOLD),
        ),
        _ if rosette => Span::styled("[✿ ]", Style::default().fg(style::Color::Magenta)),
        _ => Span::styled("[  ]", Style::default().fg(style::Color::Gray)),
    }
}

fn roster_lines(player: &Player) -> Vec<Line<'static>> {
    let color = seat_color(player.seat());
    let mut waiting: Vec<Span> = vec![" Waiting:".into()];
    let mut on_board: Vec<Span> = vec![" Board:  ".into()];
    let mut exited: Vec<Span> = vec![" Exited: ".into()];

    for token in player.tokens() {
        let span = Span::styled(format!(" {}", token.id()), Style::default().fg(color));
        if token.has_exited() {
            exited.push(span);
        } else if let Some(cell) = token.occupied_cell() {
            let text = format!(" {}@{}", token.id(), cell);
            on_board.push(Span::styled(text, Style::default().fg(color)));
        } else {
            waiting.push(span);
        }
    }

    vec![
        Line::from(format!(" Roll: {}", player.dice_roll())),
        Line::from(waiting),
        Line::from(on_board),
        Line::from(exited),
    ]
}

impl<D: Dice> Widget for GameView<'_, D> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let engine = self.engine;
        let rows = &engine.layout().display;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(rows.len() as u16 + 2),
                Constraint::Length(6),
                Constraint::Min(4),
            ])
            .split(area);

        let phase = engine.phase();
        let header = Line::from(vec![
            " ".into(),
            if phase == Phase::GameOver {
                Span::styled(" GAME OVER ", Style::default().fg(style::Color::Red))
                    .bold()
                    .add_modifier(Modifier::REVERSED)
            } else {
                Span::styled(" GAME RUNNING ", Style::default().fg(style::Color::Blue))
                    .bold()
                    .add_modifier(Modifier::REVERSED)
            },
            format!(" Phase: {}, ", phase).into(),
            match (engine.active_player(), engine.winner()) {
                (_, Some(winner)) => format!("Winner: {}", winner.name()).into(),
                (Some(active), None) => format!("Current Player: {}", active.name()).into(),
                (None, None) => "No active player".into(),
            },
        ]);

        Paragraph::new(header)
            .block(Block::bordered().border_set(border::THICK))
            .render(layout[0], buf);

        let board_lines: Vec<Line> = rows
            .iter()
            .map(|row| {
                let mut spans = vec![Span::raw(" ")];
                for cell in row {
                    spans.push(match cell {
                        Some(index) => cell_span(engine, *index),
                        None => Span::raw("    "),
                    });
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(Text::from(board_lines))
            .block(Block::bordered().title(" Board "))
            .render(layout[1], buf);

        let players_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[2]);

        for seat in Seat::ALL {
            let player = engine.player(seat);
            let border_type = if engine.active_seat() == Some(seat) {
                BorderType::Thick
            } else {
                BorderType::Plain
            };
            let block = Block::default()
                .title(Line::from(format!(" {} ", player.name()).bold()))
                .border_type(border_type)
                .border_style(Style::default().fg(seat_color(seat)))
                .borders(Borders::ALL);

            Paragraph::new(roster_lines(player))
                .block(block)
                .render(players_layout[seat.index()], buf);
        }

        let log_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(layout[3]);

        let status = match self.status {
            Some(message) => Line::from(Span::styled(
                format!(" {}", message),
                Style::default().fg(style::Color::Red),
            )),
            None => {
                let moves = engine.legal_moves().join(" ");
                Line::from(Span::raw(format!(" Moves: {}", moves)).italic())
            }
        };
        Paragraph::new(status).wrap(Wrap { trim: false }).render(log_layout[0], buf);

        // Newest messages at the top
        let visible = log_layout[1].height.saturating_sub(2) as usize;
        let items = List::new(
            self.log
                .iter()
                .rev()
                .take(visible)
                .map(|m| Line::from(format!(" {}", m))),
        );

        let block = Block::bordered()
            .title(Line::from(" Events ".bold()).centered())
            .title_bottom(Line::from(vec![
                " Roll ".into(),
                "<r> ".blue().bold(),
                " Move ".into(),
                "<1-7> ".blue().bold(),
                " Pass ".into(),
                "<p> ".blue().bold(),
                " New Game ".into(),
                "<n> ".blue().bold(),
                " Quit ".into(),
                "<q> ".blue().bold(),
            ]).right_aligned());

        Widget::render(items.block(block), log_layout[1], buf);
    }
}
