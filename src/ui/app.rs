use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use eframe::egui::{
    self, Align, Color32, ComboBox, Layout, RichText, ScrollArea, TextEdit, TopBottomPanel, Ui,
};
use log::warn;

use crate::alarm::model::{AlarmId, MealTime};
use crate::alarm::registry::AlarmRegistry;
use crate::alarm::scheduler::{
    AlarmFireEvent, AlarmScheduler, SNOOZE_MINUTES, format_minutes_away, next_alarm,
};
use crate::alert::{LogNotifier, NOTIFICATION_TITLE, Notifier, notification_body};
use crate::audio::AudioAlert;
use crate::clock::{Country, TimeDisplayMode, WallClock, format_clock_time, format_meal_time};

const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

const FOOD_ICONS: [&str; 20] = [
    "🍳", "🍔", "🍕", "🍣", "🍜", "🥗", "🍝", "🌮", "🥘", "🍲", "🥙", "🍛", "🥞", "🧇", "🍞",
    "🍖", "🍗", "🥩", "🍤", "🦐",
];
const DEFAULT_FOOD_ICON: &str = "🍛";

pub fn run_gui(
    clock: WallClock,
    registry: AlarmRegistry,
    scheduler: AlarmScheduler,
    display_mode: TimeDisplayMode,
) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("MealClock")
            .with_inner_size([420.0, 640.0])
            .with_min_inner_size([360.0, 560.0]),
        ..Default::default()
    };

    let app = MealClockApp::new(
        clock,
        registry,
        scheduler,
        display_mode,
        Box::new(LogNotifier),
        AudioAlert::start(),
    )?;

    eframe::run_native(
        "MealClock",
        native_options,
        Box::new(move |cc| {
            configure_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to launch MealClock GUI: {err}"))?;

    Ok(())
}

fn configure_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(250, 236, 211));
    visuals.panel_fill = Color32::from_rgb(43, 26, 11);
    visuals.window_fill = Color32::from_rgb(52, 32, 14);
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(48, 30, 13);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(66, 41, 18);
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(96, 58, 24);
    visuals.widgets.active.bg_fill = Color32::from_rgb(128, 78, 30);
    visuals.selection.bg_fill = Color32::from_rgb(214, 124, 46);
    visuals.hyperlink_color = Color32::from_rgb(255, 196, 110);
    ctx.set_visuals(visuals);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum View {
    Main,
    Settings,
    AlarmList,
    EditAlarm { id: AlarmId },
    Firing,
}

#[derive(Debug, Clone)]
struct MealRow {
    id: AlarmId,
    time_text: String,
    label: String,
    enabled: bool,
}

struct MealClockApp {
    clock: WallClock,
    registry: AlarmRegistry,
    scheduler: AlarmScheduler,
    display_mode: TimeDisplayMode,
    notifier: Box<dyn Notifier>,
    audio: AudioAlert,
    view: View,
    latest_now: DateTime<Tz>,
    clock_stalled: bool,
    status_message: Option<(String, Instant)>,
    edit_time_input: String,
    edit_label_input: String,
    food_icon: &'static str,
    food_rolls: i64,
}

impl MealClockApp {
    fn new(
        clock: WallClock,
        registry: AlarmRegistry,
        scheduler: AlarmScheduler,
        display_mode: TimeDisplayMode,
        notifier: Box<dyn Notifier>,
        audio: AudioAlert,
    ) -> Result<Self> {
        let latest_now = clock.now()?;
        Ok(Self {
            clock,
            registry,
            scheduler,
            display_mode,
            notifier,
            audio,
            view: View::Main,
            latest_now,
            clock_stalled: false,
            status_message: None,
            edit_time_input: String::new(),
            edit_label_input: String::new(),
            food_icon: DEFAULT_FOOD_ICON,
            food_rolls: 0,
        })
    }

    fn set_status(&mut self, text: impl Into<String>, ttl: Duration) {
        self.status_message = Some((text.into(), Instant::now() + ttl));
    }

    fn advance_clock(&mut self) {
        match self.clock.now() {
            Ok(now) => {
                self.latest_now = now;
                if self.clock_stalled {
                    self.clock_stalled = false;
                    self.set_status("Clock recovered.", Duration::from_secs(3));
                }
                if let Some(event) = self.scheduler.tick(&self.registry, &now) {
                    self.handle_fire(&event);
                }
            }
            Err(err) => {
                // keep showing the last good time; alarms resume once the source recovers
                if !self.clock_stalled {
                    self.clock_stalled = true;
                    warn!("clock source unavailable: {err:#}");
                    self.set_status(
                        format!("Clock unavailable: {err}"),
                        Duration::from_secs(4),
                    );
                }
            }
        }
    }

    fn handle_fire(&mut self, event: &AlarmFireEvent) {
        let body = notification_body(event);
        if let Err(err) = self.notifier.notify(NOTIFICATION_TITLE, &body) {
            warn!("notification failed: {err:#}");
        }
        self.audio.start_loop();
        self.view = View::Firing;
    }

    fn stop_alarm(&mut self) {
        self.audio.stop();
        if self.scheduler.stop() {
            self.set_status("Alarm stopped.", Duration::from_secs(2));
        }
        self.view = View::Main;
    }

    fn snooze_alarm(&mut self) {
        self.audio.stop();
        let now = self.latest_now;
        if let Some(id) = self.scheduler.snooze(&mut self.registry, &now)
            && let Some(entry) = self.registry.get(id)
        {
            self.set_status(
                format!("Snoozed until {}.", entry.time),
                Duration::from_secs(3),
            );
        }
        self.view = View::Main;
    }

    fn add_new_meal(&mut self) {
        let id = self.registry.add(MealTime::from_minutes(12 * 60), "New Meal", false);
        self.begin_edit(id);
    }

    fn begin_edit(&mut self, id: AlarmId) {
        if let Some(entry) = self.registry.get(id) {
            self.edit_time_input = entry.time.to_string();
            self.edit_label_input = entry.label.clone();
            self.view = View::EditAlarm { id };
        }
    }

    fn submit_edit(&mut self, id: AlarmId) {
        let time = match MealTime::parse(&self.edit_time_input) {
            Ok(time) => time,
            Err(err) => {
                // entry keeps its previous time until the input parses
                self.set_status(err.to_string(), Duration::from_secs(4));
                return;
            }
        };
        match self.registry.update(id, time, self.edit_label_input.clone()) {
            Ok(()) => self.view = View::AlarmList,
            Err(err) => {
                self.set_status(err.to_string(), Duration::from_secs(4));
                self.view = View::AlarmList;
            }
        }
    }

    fn delete_alarm(&mut self, id: AlarmId) {
        match self.registry.remove(id) {
            Ok(removed) => {
                if matches!(self.view, View::EditAlarm { id: editing } if editing == id) {
                    self.view = View::AlarmList;
                }
                self.set_status(format!("Removed '{}'.", removed.label), Duration::from_secs(3));
            }
            Err(err) => self.set_status(err.to_string(), Duration::from_secs(3)),
        }
    }

    fn toggle_alarm(&mut self, id: AlarmId) {
        if let Err(err) = self.registry.toggle(id) {
            self.set_status(err.to_string(), Duration::from_secs(3));
        }
    }

    fn set_country(&mut self, country: Country) {
        if country == self.clock.country() {
            return;
        }
        self.clock.set_country(country);
        self.set_status(format!("Country set to {country}."), Duration::from_secs(2));
        self.advance_clock();
    }

    fn roll_food_icon(&mut self) {
        self.food_rolls += 1;
        let seed = self.latest_now.timestamp_millis() + self.food_rolls;
        let index = seed.rem_euclid(FOOD_ICONS.len() as i64) as usize;
        self.food_icon = FOOD_ICONS[index];
    }

    fn toggle_display_mode(&mut self) {
        self.display_mode = match self.display_mode {
            TimeDisplayMode::Hour24 => TimeDisplayMode::Hour12,
            TimeDisplayMode::Hour12 => TimeDisplayMode::Hour24,
        };
    }

    fn show_header(&mut self, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.label(
                RichText::new("TIME TO EAT <3")
                    .size(22.0)
                    .color(Color32::from_rgb(255, 179, 71))
                    .strong(),
            );
            ui.separator();
            ui.label(
                RichText::new(format!("[{}]", self.clock.country()))
                    .size(15.0)
                    .color(Color32::from_rgb(224, 186, 139)),
            );
            ui.separator();
            ui.label(
                RichText::new(format_clock_time(&self.latest_now, self.display_mode))
                    .size(20.0)
                    .color(Color32::from_rgb(255, 224, 150))
                    .strong(),
            );
        });

        if self.clock_stalled {
            ui.label(
                RichText::new("Clock source unavailable. Showing the last known time.")
                    .color(Color32::from_rgb(255, 138, 101))
                    .strong(),
            );
        }
        if let Some((msg, _)) = &self.status_message {
            ui.label(
                RichText::new(msg)
                    .color(Color32::from_rgb(173, 222, 129))
                    .strong(),
            );
        }
    }

    fn show_footer(&mut self, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.label(
                RichText::new(format!(
                    "Timezone: {}",
                    self.clock.country().timezone().name()
                ))
                .color(Color32::from_rgb(189, 160, 124)),
            );
            ui.separator();
            ui.label(
                RichText::new(format!("{} meal alarm(s) configured", self.registry.len()))
                    .color(Color32::from_rgb(189, 160, 124)),
            );
        });
    }

    fn show_main(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(10.0);
            ui.label(
                RichText::new(self.latest_now.format("%A, %B %d").to_string())
                    .size(16.0)
                    .color(Color32::from_rgb(224, 186, 139)),
            );
            ui.label(
                RichText::new(format_clock_time(&self.latest_now, self.display_mode))
                    .size(52.0)
                    .color(Color32::from_rgb(255, 214, 117))
                    .strong(),
            );
            match next_alarm(&self.registry, &self.latest_now) {
                Some(next) => {
                    ui.label(
                        RichText::new(format!(
                            "Next: {} at {} ({})",
                            next.entry.label,
                            format_meal_time(next.entry.time, self.display_mode),
                            format_minutes_away(next.minutes_away)
                        ))
                        .size(15.0)
                        .color(Color32::from_rgb(173, 222, 129)),
                    );
                }
                None => {
                    ui.label(
                        RichText::new("No meal alarms enabled.")
                            .size(15.0)
                            .color(Color32::from_rgb(189, 160, 124)),
                    );
                }
            }

            ui.add_space(18.0);
            ui.label(RichText::new(self.food_icon).size(64.0));
            if ui
                .button(RichText::new("Food Idea!").size(16.0).strong())
                .clicked()
            {
                self.roll_food_icon();
            }

            ui.add_space(18.0);
            ui.horizontal(|ui| {
                ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                    if ui
                        .add(
                            egui::Button::new(RichText::new("Meal Alarms").strong())
                                .fill(Color32::from_rgb(112, 66, 20))
                                .min_size(egui::vec2(150.0, 34.0)),
                        )
                        .clicked()
                    {
                        self.view = View::AlarmList;
                    }
                    if ui
                        .add(
                            egui::Button::new(RichText::new("Settings").strong())
                                .fill(Color32::from_rgb(92, 54, 18))
                                .min_size(egui::vec2(150.0, 34.0)),
                        )
                        .clicked()
                    {
                        self.view = View::Settings;
                    }
                });
            });
        });
    }

    fn show_alarm_list(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading(
                RichText::new("ALARMS")
                    .color(Color32::from_rgb(255, 179, 71))
                    .strong(),
            );
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button(RichText::new("+ Add Meal").strong()).clicked() {
                    self.add_new_meal();
                }
            });
        });
        ui.add_space(4.0);

        if self.registry.is_empty() {
            ui.label(
                RichText::new("No meal alarms configured.")
                    .color(Color32::from_rgb(255, 190, 106))
                    .strong(),
            );
        }

        let rows: Vec<MealRow> = self
            .registry
            .list()
            .iter()
            .map(|entry| MealRow {
                id: entry.id,
                time_text: entry.time.to_string(),
                label: entry.label.clone(),
                enabled: entry.enabled,
            })
            .collect();

        let mut edit_id: Option<AlarmId> = None;
        let mut toggle_id: Option<AlarmId> = None;
        ScrollArea::vertical().id_salt("meals_scroll").show(ui, |ui| {
            for row in &rows {
                ui.horizontal(|ui| {
                    if ui
                        .selectable_label(
                            false,
                            RichText::new(&row.time_text).size(24.0).strong(),
                        )
                        .clicked()
                    {
                        edit_id = Some(row.id);
                    }
                    ui.label(RichText::new(&row.label).size(15.0));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let mut on = row.enabled;
                        if ui
                            .checkbox(&mut on, if row.enabled { "on" } else { "off" })
                            .changed()
                        {
                            toggle_id = Some(row.id);
                        }
                    });
                });
                ui.separator();
            }
        });

        if let Some(id) = toggle_id {
            self.toggle_alarm(id);
        }
        if let Some(id) = edit_id {
            self.begin_edit(id);
        }

        ui.add_space(8.0);
        if ui.button("Back").clicked() {
            self.view = View::Main;
        }
    }

    fn show_edit_alarm(&mut self, ui: &mut Ui, id: AlarmId) {
        if self.registry.get(id).is_none() {
            self.view = View::AlarmList;
            return;
        }

        ui.vertical_centered(|ui| {
            ui.heading(
                RichText::new("EDIT ALARM")
                    .color(Color32::from_rgb(255, 179, 71))
                    .strong(),
            );
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                ui.label("Time");
                ui.add(TextEdit::singleline(&mut self.edit_time_input).desired_width(90.0));
            });
            ui.horizontal(|ui| {
                ui.label("Label");
                ui.add(
                    TextEdit::singleline(&mut self.edit_label_input)
                        .desired_width(190.0)
                        .hint_text("e.g., Breakfast"),
                );
            });
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                if ui
                    .add(
                        egui::Button::new(RichText::new("Save").strong())
                            .fill(Color32::from_rgb(47, 92, 37))
                            .min_size(egui::vec2(90.0, 30.0)),
                    )
                    .clicked()
                {
                    self.submit_edit(id);
                }
                if ui.button("Cancel").clicked() {
                    self.view = View::AlarmList;
                }
                if ui
                    .add(
                        egui::Button::new(
                            RichText::new("Delete")
                                .color(Color32::from_rgb(255, 124, 124))
                                .strong(),
                        )
                        .fill(Color32::from_rgb(71, 24, 18)),
                    )
                    .clicked()
                {
                    self.delete_alarm(id);
                }
            });
        });
    }

    fn show_settings(&mut self, ui: &mut Ui) {
        ui.heading(
            RichText::new("SETTINGS")
                .color(Color32::from_rgb(255, 179, 71))
                .strong(),
        );
        ui.add_space(10.0);

        ui.label(RichText::new("Change country").strong());
        let mut selected = self.clock.country();
        ComboBox::from_id_salt("country_select")
            .selected_text(selected.to_string())
            .show_ui(ui, |ui| {
                for country in Country::ALL {
                    ui.selectable_value(&mut selected, country, country.to_string());
                }
            });
        if selected != self.clock.country() {
            self.set_country(selected);
        }

        ui.add_space(10.0);
        ui.label(RichText::new("Change alarm").strong());
        ui.label("Sound (default)");

        ui.add_space(10.0);
        ui.label(RichText::new("Time format").strong());
        if ui
            .button(match self.display_mode {
                TimeDisplayMode::Hour24 => "Switch to 12h",
                TimeDisplayMode::Hour12 => "Switch to 24h",
            })
            .clicked()
        {
            self.toggle_display_mode();
        }

        ui.add_space(14.0);
        if ui.button("Back").clicked() {
            self.view = View::Main;
        }
    }

    fn show_firing(&mut self, ui: &mut Ui) {
        let Some(event) = self.scheduler.firing().cloned() else {
            self.view = View::Main;
            return;
        };

        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.label(RichText::new("🔔").size(70.0));
            ui.heading(
                RichText::new("TIME TO EAT!")
                    .size(32.0)
                    .color(Color32::from_rgb(255, 101, 101))
                    .strong(),
            );
            ui.add_space(8.0);
            ui.label(
                RichText::new(&event.label)
                    .size(24.0)
                    .color(Color32::from_rgb(255, 224, 150))
                    .strong(),
            );
            ui.label(
                RichText::new(event.time.to_string())
                    .size(20.0)
                    .color(Color32::from_rgb(224, 186, 139)),
            );
            ui.add_space(24.0);
            ui.horizontal(|ui| {
                ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                    if ui
                        .add(
                            egui::Button::new(
                                RichText::new(format!("Snooze\n+{SNOOZE_MINUTES} min")).strong(),
                            )
                            .fill(Color32::from_rgb(148, 102, 22))
                            .min_size(egui::vec2(130.0, 48.0)),
                        )
                        .clicked()
                    {
                        self.snooze_alarm();
                    }
                    if ui
                        .add(
                            egui::Button::new(RichText::new("Stop").strong())
                                .fill(Color32::from_rgb(47, 92, 37))
                                .min_size(egui::vec2(130.0, 48.0)),
                        )
                        .clicked()
                    {
                        self.stop_alarm();
                    }
                });
            });
        });
    }
}

impl eframe::App for MealClockApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some((_, expires_at)) = &self.status_message
            && Instant::now() >= *expires_at
        {
            self.status_message = None;
        }

        self.advance_clock();

        TopBottomPanel::top("header")
            .resizable(false)
            .show(ctx, |ui| self.show_header(ui));

        TopBottomPanel::bottom("footer")
            .resizable(false)
            .show(ctx, |ui| self.show_footer(ui));

        egui::CentralPanel::default().show(ctx, |ui| match self.view.clone() {
            View::Main => self.show_main(ui),
            View::Settings => self.show_settings(ui),
            View::AlarmList => self.show_alarm_list(ui),
            View::EditAlarm { id } => self.show_edit_alarm(ui, id),
            View::Firing => self.show_firing(ui),
        });

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
