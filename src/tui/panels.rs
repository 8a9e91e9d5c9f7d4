//! Panels Module
//! Rendering of the tab bar, the four tab bodies and the footer.

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Gauge, List, ListItem, Paragraph, Row, Table, Tabs, Wrap,
};
use ratatui::Frame;

use super::app::{App, Tab};
use super::theme;
use crate::stats::{UrbanUnitStats, YearBreakdown};

const BREAKDOWN_BAR_WIDTH: usize = 20;
const RISKY_ZONES_SHOWN: usize = 5;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    draw_tabs(frame, app, header);

    if app.is_loading() {
        draw_loading(frame, app, body);
    } else {
        match app.tab {
            Tab::Overview => draw_overview(frame, app, body),
            Tab::Units => draw_units(frame, app, body),
            Tab::Zones => draw_zones(frame, app, body),
            Tab::Help => draw_help(frame, body),
        }
    }

    draw_footer(frame, app, footer);
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = Tab::ALL.iter().map(|tab| {
        Line::from(Span::styled(tab.title(), Style::default().fg(theme::TEXT)))
    });
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .highlight_style(
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    " Analyseur de Cambriolages ",
                    Style::default()
                        .fg(theme::TITLE)
                        .add_modifier(Modifier::BOLD),
                )),
        );
    frame.render_widget(tabs, area);
}

fn draw_loading(frame: &mut Frame, app: &App, area: Rect) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(5),
        Constraint::Min(0),
    ])
    .areas(area);
    let [_, centered, _] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Percentage(60),
        Constraint::Min(0),
    ])
    .areas(middle);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Chargement des données géographiques "),
        )
        .gauge_style(Style::default().fg(theme::ACCENT).bg(theme::SURFACE))
        .ratio(f64::from(app.progress / 100.0).clamp(0.0, 1.0))
        .label(app.status.clone());
    frame.render_widget(gauge, centered);
}

fn draw_overview(frame: &mut Frame, app: &App, area: Rect) {
    let Some(session) = &app.session else {
        return;
    };
    let summary = &session.summary;

    let mut lines = vec![
        Line::default(),
        stat_line("Zones géographiques", summary.row_count.to_string()),
        stat_line("Unités urbaines", summary.unit_count.to_string()),
        stat_line("Années couvertes", summary.years.join(", ")),
        Line::default(),
    ];

    match &summary.manifest {
        Some(manifest) => {
            lines.push(stat_line(
                "Dernier téléchargement",
                manifest.fetched_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            ));
            lines.push(stat_line(
                "Fichiers sur disque",
                format!(
                    "{} ({:.1} Mo)",
                    manifest.files.len(),
                    manifest.total_bytes() as f64 / 1_000_000.0
                ),
            ));
        }
        None => lines.push(Line::from(Span::styled(
            "  Aucun manifeste de téléchargement trouvé",
            Style::default().fg(theme::SUBTEXT),
        ))),
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "  Onglet « Unités urbaines » : « / » filtre la liste, Entrée ouvre les zones.",
        Style::default().fg(theme::SUBTEXT),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Aperçu du jeu de données "),
    );
    frame.render_widget(paragraph, area);
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {label:<24}"),
            Style::default().fg(theme::SUBTEXT),
        ),
        Span::styled(
            value,
            Style::default()
                .fg(theme::TEXT)
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

fn draw_units(frame: &mut Frame, app: &mut App, area: Rect) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);
    let [search_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(left);

    // Search box
    let search_style = if app.searching {
        Style::default().fg(theme::ACCENT)
    } else {
        Style::default().fg(theme::SUBTEXT)
    };
    let mut search_text = app.search.clone();
    if app.searching {
        search_text.push('▌');
    }
    let search = Paragraph::new(search_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(search_style)
            .title(" Recherche (/) "),
    );
    frame.render_widget(search, search_area);

    // Unit list
    let Some(session) = &app.session else {
        return;
    };
    let items: Vec<ListItem> = app
        .filtered_units
        .iter()
        .filter_map(|&idx| session.units.get(idx))
        .map(|unit| {
            ListItem::new(Line::from(vec![
                Span::styled(unit.libelle_uu.clone(), Style::default().fg(theme::TEXT)),
                Span::styled(
                    format!(" ({})", unit.code_uu),
                    Style::default().fg(theme::SUBTEXT),
                ),
            ]))
        })
        .collect();

    let title = format!(
        " Unités urbaines ({}/{}) ",
        app.filtered_units.len(),
        session.units.len()
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );

    app.unit_list_state.select(if app.filtered_units.is_empty() {
        None
    } else {
        Some(app.unit_selected)
    });
    frame.render_stateful_widget(list, list_area, &mut app.unit_list_state);

    // Analysis pane
    let detail = match app.selected_unit_stats() {
        Some(stats) => unit_detail_lines(stats),
        None => vec![Line::from(Span::styled(
            "  Aucune unité urbaine sélectionnée",
            Style::default().fg(theme::SUBTEXT),
        ))],
    };
    let paragraph = Paragraph::new(detail)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Analyse "));
    frame.render_widget(paragraph, right);
}

fn unit_detail_lines(stats: &UrbanUnitStats) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::default(),
        Line::from(vec![
            Span::styled(
                format!("  {}", stats.libelle_uu),
                Style::default()
                    .fg(theme::TITLE)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  (UU {})", stats.code_uu),
                Style::default().fg(theme::SUBTEXT),
            ),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "  Répartition des zones par niveau de risque :",
            Style::default().fg(theme::TEXT),
        )),
        Line::default(),
    ];

    for breakdown in &stats.per_year {
        lines.push(breakdown_line(breakdown));
    }

    lines.push(Line::default());
    if stats.risky_zones.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Aucune zone à risque élevé",
            Style::default().fg(theme::RISK_LOW),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!(
                "  Zones à risque élevé ({} au total) :",
                stats.risky_zones.len()
            ),
            Style::default().fg(theme::RISK_HIGH),
        )));
        for zone in stats.risky_zones.iter().take(RISKY_ZONES_SHOWN) {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("    {}  ", zone.year),
                    Style::default().fg(theme::SUBTEXT),
                ),
                Span::styled(zone.band_label.clone(), Style::default().fg(theme::TEXT)),
                Span::styled(
                    format!("  ({} pour 1000 logements)", format_rate(zone.rate)),
                    Style::default().fg(theme::RISK_HIGH),
                ),
            ]));
        }
    }

    lines
}

fn breakdown_line(breakdown: &YearBreakdown) -> Line<'static> {
    let (low, medium, high) = breakdown.percentages();

    // Three colored segments, sized on the percentage split
    let low_cells = BREAKDOWN_BAR_WIDTH * low as usize / 100;
    let high_cells = BREAKDOWN_BAR_WIDTH * high as usize / 100;
    let medium_cells = BREAKDOWN_BAR_WIDTH - low_cells - high_cells;

    Line::from(vec![
        Span::styled(
            format!("  {}  {:>4} zones  ", breakdown.year, breakdown.total),
            Style::default().fg(theme::TEXT),
        ),
        Span::styled("█".repeat(low_cells), Style::default().fg(theme::RISK_LOW)),
        Span::styled(
            "█".repeat(medium_cells),
            Style::default().fg(theme::RISK_MEDIUM),
        ),
        Span::styled("█".repeat(high_cells), Style::default().fg(theme::RISK_HIGH)),
        Span::styled(
            format!("  {low:>3}% faible "),
            Style::default().fg(theme::RISK_LOW),
        ),
        Span::styled(
            format!("{medium:>3}% moyen "),
            Style::default().fg(theme::RISK_MEDIUM),
        ),
        Span::styled(
            format!("{high:>3}% élevé"),
            Style::default().fg(theme::RISK_HIGH),
        ),
    ])
}

fn draw_zones(frame: &mut Frame, app: &App, area: Rect) {
    let zones = app.zone_rows();
    let visible = area.height.saturating_sub(4) as usize;
    let start = app.zones_scroll.min(zones.len().saturating_sub(1));
    let end = (start + visible.max(1)).min(zones.len());

    let rows: Vec<Row> = zones[start..end]
        .iter()
        .map(|zone| {
            let level = zone.risk_level();
            Row::new(vec![
                Span::styled(zone.year.clone(), Style::default().fg(theme::SUBTEXT)),
                Span::styled(zone.code_uu.clone(), Style::default().fg(theme::SUBTEXT)),
                Span::styled(zone.libelle_uu.clone(), Style::default().fg(theme::TEXT)),
                Span::styled(zone.band_label.clone(), Style::default().fg(theme::TEXT)),
                Span::styled(
                    format_rate(zone.rate()),
                    Style::default().fg(theme::risk_color(level)),
                ),
                Span::styled(
                    level.label().to_string(),
                    Style::default()
                        .fg(theme::risk_color(level))
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    let scope = if app.zones_show_all {
        "tout le jeu de données".to_string()
    } else {
        app.selected_unit()
            .map(|u| u.libelle_uu.clone())
            .unwrap_or_else(|| "tout le jeu de données".to_string())
    };
    let title = if zones.is_empty() {
        format!(" Zones — {scope} ")
    } else {
        format!(" Zones — {scope} ({}-{}/{}) ", start + 1, end, zones.len())
    };

    let header = Row::new(vec![
        "Année",
        "Code UU",
        "Unité urbaine",
        "Classe",
        "Taux",
        "Risque",
    ])
    .style(
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Min(18),
            Constraint::Min(24),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .column_spacing(2)
    .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::default(),
        help_heading("Fonctionnalités"),
        help_line("Analyse des taux de cambriolages de logements par zone"),
        help_line("Données géographiques infracommunales, période 2018-2022"),
        help_line("Répartition annuelle par niveau de risque et zones dangereuses"),
        Line::default(),
        help_heading("Unités urbaines (UU)"),
        help_line("Les données sont regroupées par unités urbaines (définition INSEE) :"),
        help_line("Saint-Ouen ou Boulogne-Billancourt relèvent de l'UU « Paris »."),
        Line::default(),
        help_heading("Niveaux de risque (pour 1000 logements)"),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Faible", Style::default().fg(theme::RISK_LOW)),
            Span::raw(" : taux ≤ 5    "),
            Span::styled("Moyen", Style::default().fg(theme::RISK_MEDIUM)),
            Span::raw(" : 5 < taux ≤ 10    "),
            Span::styled("Élevé", Style::default().fg(theme::RISK_HIGH)),
            Span::raw(" : taux > 10"),
        ]),
        Line::default(),
        help_heading("Raccourcis"),
        help_line("Tab / ← → : changer d'onglet    1-4 : onglet direct"),
        help_line("↑ ↓ / PgUp PgDn : naviguer      / : filtrer les unités urbaines"),
        help_line("Entrée : zones de l'unité sélectionnée    a : toutes les zones"),
        help_line("q ou Échap : quitter"),
        Line::default(),
        help_heading("Source des données"),
        help_line("Service statistique ministériel de la sécurité intérieure (SSMSI),"),
        help_line("publié sur data.gouv.fr — granularité infracommunale."),
    ];

    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Aide "));
    frame.render_widget(paragraph, area);
}

fn help_heading(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
    ))
}

fn help_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("    {text}"),
        Style::default().fg(theme::TEXT),
    ))
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = if app.is_loading() {
        "q quitter"
    } else {
        match app.tab {
            Tab::Overview => "Tab onglet suivant  •  q quitter",
            Tab::Units => {
                if app.searching {
                    "saisie du filtre  •  Entrée valider  •  Échap annuler"
                } else {
                    "↑↓ sélection  •  / recherche  •  Entrée zones  •  q quitter"
                }
            }
            Tab::Zones => "↑↓ défiler  •  a unité/tout  •  Tab onglet  •  q quitter",
            Tab::Help => "Tab onglet suivant  •  q quitter",
        }
    };

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(app.status.clone(), Style::default().fg(theme::ACCENT)),
        Span::styled("   ", Style::default()),
        Span::styled(hints, Style::default().fg(theme::SUBTEXT)),
    ]))
    .alignment(Alignment::Left)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn format_rate(rate: f64) -> String {
    format!("{rate:.1}").replace('.', ",")
}
