use crate::catalog::Product;
use crate::fetcher::QueryDispatcher;
use crate::tui::app::{App, DropdownContent, DropdownItem, Focus, QueryStatus};
use crate::tui::colors;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const DESCRIPTION_LINES: usize = 4;

pub fn draw<D: QueryDispatcher>(frame: &mut Frame, app: &mut App<D>) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Search bar
            Constraint::Min(3),    // Details, dropdown drawn over it
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title(frame, chunks[0]);
    draw_search_bar(frame, app, chunks[1]);
    draw_details(frame, app, chunks[2]);

    if app.is_open {
        draw_dropdown(frame, app, chunks[2]);
    } else {
        app.layout.list = Rect::default();
    }

    draw_status_bar(frame, app, chunks[3]);

    if app.focus == Focus::Input {
        // border (1) + " \u{1F50D} " (4 display cols)
        let cursor_x = chunks[1].x + 1 + 4 + app.search.cursor_column() as u16;
        let cursor_y = chunks[1].y + 1;
        frame.set_cursor_position(Position::new(
            cursor_x.min(chunks[1].right().saturating_sub(2)),
            cursor_y,
        ));
    }
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("Product Search")
        .centered()
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
    frame.render_widget(title, area);
}

fn draw_search_bar<D: QueryDispatcher>(frame: &mut Frame, app: &mut App<D>, area: Rect) {
    let border_style = if app.focus == Focus::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Search ");

    let line = if app.search.query.is_empty() {
        Line::from(vec![
            Span::raw(format!(" {} ", colors::SEARCH_ICON)),
            Span::styled(
                "Search products...",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(vec![
            Span::raw(format!(" {} ", colors::SEARCH_ICON)),
            Span::styled(app.search.query.as_str(), Style::default().fg(Color::White)),
        ])
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
    app.layout.input = area;

    if app.search.query.is_empty() || area.width < 8 {
        app.layout.clear_button = Rect::default();
        return;
    }

    let clear_area = Rect::new(area.right().saturating_sub(4), area.y + 1, 2, 1);
    frame.render_widget(
        Paragraph::new(colors::CLEAR_ICON).style(Style::default().fg(Color::Gray)),
        clear_area,
    );
    app.layout.clear_button = clear_area;
}

fn draw_dropdown<D: QueryDispatcher>(frame: &mut Frame, app: &mut App<D>, area: Rect) {
    let content = app.dropdown_content();
    let header_lines: u16 = if app.show_popular_header() { 1 } else { 0 };

    // Borders take two lines; the list gets whatever is left up to the cap
    let room = area.height.saturating_sub(2 + header_lines) as usize;
    app.list.set_max_viewport(app.dropdown_cap.min(room));

    let body_lines = match content {
        DropdownContent::List => app.list.viewport_size() as u16,
        _ => 1,
    };
    let height = (body_lines + header_lines + 2).min(area.height);
    let popup_area = Rect::new(area.x, area.y, area.width, height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if header_lines > 0 && inner.height > 0 {
        frame.render_widget(
            Paragraph::new(" Popular Searches").style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            ),
            Rect::new(inner.x, inner.y, inner.width, 1),
        );
    }

    let body = Rect::new(
        inner.x,
        inner.y + header_lines,
        inner.width,
        inner.height.saturating_sub(header_lines),
    );

    let message = match &content {
        DropdownContent::Loading => Some((
            format!(
                "{} Searching products...",
                colors::SPINNER[(app.tick_count as usize / 2) % colors::SPINNER.len()]
            ),
            Style::default().fg(Color::Cyan),
        )),
        DropdownContent::Error => Some((
            "Error loading products. Please try again.".to_string(),
            Style::default().fg(Color::Red),
        )),
        DropdownContent::NoResults(query) => Some((
            format!("No products found for \"{}\"", query),
            Style::default().fg(Color::DarkGray),
        )),
        DropdownContent::List => None,
    };

    if let Some((text, style)) = message {
        app.layout.list = Rect::default();
        frame.render_widget(
            Paragraph::new(text).centered().style(style),
            body,
        );
        return;
    }

    draw_list(frame, app, body);
}

/// Render only the rows of the virtual window that land inside `area`
fn draw_list<D: QueryDispatcher>(frame: &mut Frame, app: &mut App<D>, area: Rect) {
    let viewport = (app.list.viewport_size() as u16).min(area.height) as usize;
    let list_area = Rect::new(area.x, area.y, area.width, viewport as u16);
    app.layout.list = list_area;

    let offset = app.list.scroll_offset();
    let width = list_area.width as usize;

    for item in app.list.virtual_items() {
        let Some(row) = app.item(item.index) else {
            continue;
        };

        let is_highlighted = app.highlighted == Some(item.index);
        let bg = if is_highlighted {
            colors::HIGHLIGHT_BG
        } else if item.index % 2 == 1 {
            colors::ALT_ROW_BG
        } else {
            Color::Reset
        };

        for line in 0..item.size {
            let pos = item.start + line;
            if pos < offset || pos >= offset + viewport {
                continue;
            }
            let y = list_area.y + (pos - offset) as u16;
            let text = row_line(row, line, width, is_highlighted);
            frame.render_widget(
                Paragraph::new(text).style(Style::default().bg(bg)),
                Rect::new(list_area.x, y, list_area.width, 1),
            );
        }
    }
}

fn row_line(row: DropdownItem<'_>, line: usize, width: usize, highlighted: bool) -> Line<'static> {
    let emphasis = if highlighted {
        Modifier::BOLD
    } else {
        Modifier::empty()
    };

    match (row, line) {
        (DropdownItem::Product(product), 0) => {
            let icon = colors::icon_for_category(&product.category);
            let title = truncate_to_width(&product.title, width.saturating_sub(5));
            Line::from(vec![
                Span::raw(format!(" {} ", icon)),
                Span::styled(
                    title,
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | emphasis),
                ),
            ])
        }
        (DropdownItem::Product(product), 1) => Line::from(Span::styled(
            format!("    {}", truncate_to_width(&product.category, width.saturating_sub(5))),
            Style::default().fg(colors::color_for_category(&product.category)),
        )),
        (DropdownItem::Popular(term), 0) => Line::from(vec![
            Span::styled(
                format!(" {} ", colors::SEARCH_ICON),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                term.to_string(),
                Style::default().fg(Color::White).add_modifier(emphasis),
            ),
        ]),
        _ => Line::default(),
    }
}

fn draw_details<D: QueryDispatcher>(frame: &mut Frame, app: &App<D>, area: Rect) {
    let border_style = if app.focus == Focus::Details {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Details ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(product) = &app.selected else {
        // centered vertically so an open dropdown doesn't hide it
        let hint_area = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
        frame.render_widget(
            Paragraph::new("Select a product to see its details")
                .centered()
                .style(Style::default().fg(Color::DarkGray)),
            hint_area.intersection(inner),
        );
        return;
    };

    let lines = detail_lines(product, inner.width.saturating_sub(2) as usize);
    frame.render_widget(
        Paragraph::new(lines),
        Rect::new(
            inner.x + 1,
            inner.y,
            inner.width.saturating_sub(2),
            inner.height,
        ),
    );
}

fn detail_lines(product: &Product, width: usize) -> Vec<Line<'static>> {
    let price = product.display_price();
    let title_width = width.saturating_sub(price.width() + 1);
    let title = truncate_to_width(&product.title, title_width);
    let gap = width.saturating_sub(title.width() + price.width());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                title,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" ".repeat(gap)),
            Span::styled(
                price,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!(" {} ", product.category),
                Style::default()
                    .fg(Color::Black)
                    .bg(colors::color_for_category(&product.category)),
            ),
            Span::raw(" "),
            Span::styled(
                colors::rating_stars(product.rating.rate),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(format!(
                " {} ({} reviews)",
                product.rating.rate, product.rating.count
            )),
        ]),
        Line::default(),
    ];

    let image = if product.has_remote_image() {
        truncate_to_width(&product.image, width.saturating_sub(7))
    } else {
        "[placeholder 160x160]".to_string()
    };
    lines.push(Line::from(vec![
        Span::styled("Image: ", Style::default().fg(Color::DarkGray)),
        Span::styled(image, Style::default().fg(Color::Blue)),
    ]));
    lines.push(Line::default());

    for text in wrap_clamped(&product.description, width, DESCRIPTION_LINES) {
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(Color::Gray),
        )));
    }

    lines
}

fn draw_status_bar<D: QueryDispatcher>(frame: &mut Frame, app: &App<D>, area: Rect) {
    let left_text = match &app.status {
        QueryStatus::Loading => " Searching products...".to_string(),
        QueryStatus::Error(e) => format!(" Error: {}", e),
        QueryStatus::Ready => {
            let count = app.products.as_ref().map(|p| p.len()).unwrap_or(0);
            let mut text = format!(" {} results for \"{}\"", count, app.debounced_query());
            if app.refreshing {
                text.push_str(" (refreshing)");
            }
            if let Some(updated) = app.last_updated {
                text.push_str(&format!(" | updated {}", updated.format("%H:%M:%S")));
            }
            text
        }
        QueryStatus::Idle => " Ready".to_string(),
    };

    let right_text =
        " \u{2191}\u{2193}:Navigate  Enter:Select  Tab:Details  Ctrl+U:Clear  Esc:Close  Ctrl+Q:Quit ";

    // left-aligned text + padding + right-aligned hints
    let available_width = area.width as usize;
    let left_len = left_text.width();
    let right_len = right_text.width();

    let status_str = if left_len + right_len < available_width {
        let padding = available_width - left_len - right_len;
        format!("{}{:padding$}{}", left_text, "", right_text, padding = padding)
    } else {
        // Not enough space, just show left text
        truncate_to_width(&left_text, available_width)
    };

    let status = Paragraph::new(status_str)
        .style(Style::default().fg(Color::White).bg(colors::HEADER_BG));

    frame.render_widget(status, area);
}

/// Cut `text` to at most `max` display columns, ending in an ellipsis when cut
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('\u{2026}');
    out
}

/// Word-wrap `text` to `width` columns, keeping at most `max_lines` lines.
/// The last kept line gets an ellipsis when text was dropped.
pub fn wrap_clamped(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word = truncate_to_width(word, width);
        let needed = if current.is_empty() {
            word.width()
        } else {
            current.width() + 1 + word.width()
        };

        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let cut = truncate_to_width(last, width.saturating_sub(1));
            *last = if cut.ends_with('\u{2026}') {
                cut
            } else {
                format!("{}\u{2026}", cut)
            };
        }
    }
    lines
}
