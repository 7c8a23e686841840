use portfolio_chat_core::{KnowledgeContext, Provider, WidgetController};

pub struct App {
    pub should_quit: bool,
    pub widget: WidgetController,

    // Draft input
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Transcript viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub provider: Provider,
    pub model: String,
    pub knowledge: KnowledgeContext,
}

impl App {
    pub fn new(
        widget: WidgetController,
        provider: Provider,
        model: String,
        knowledge: KnowledgeContext,
    ) -> Self {
        Self {
            should_quit: false,
            widget,
            input: String::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            provider,
            model,
            knowledge,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.widget.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Apply a pending scroll-to-latest request from the widget.
    pub fn sync_scroll(&mut self) {
        if self.widget.take_scroll_request() {
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        // Default to 40 columns until the first render records the real width
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            40
        };

        // The transcript is never trimmed, so count wide and clamp at the end
        let mut total_lines: usize = 0;

        for msg in self.widget.messages() {
            total_lines += 1; // Sender line
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                total_lines += (char_count / wrap_width) + 1;
            }
            total_lines += 1; // Blank line after message
        }

        if self.widget.is_pending() {
            total_lines += 2; // Sender line + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            10
        };

        let scroll = total_lines.saturating_sub(visible_height as usize);
        self.chat_scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.input_cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_chat_core::{build_backend, ModelClient, PromptBuilder};

    fn app_with_greeting(greeting: &str) -> App {
        let knowledge = KnowledgeContext::new();
        let client = ModelClient::new(build_backend(Provider::Gemini, None, "gemini-2.5-flash"));
        let widget =
            WidgetController::new(greeting, knowledge.clone(), PromptBuilder::default(), client);
        App::new(widget, Provider::Gemini, "gemini-2.5-flash".to_string(), knowledge)
    }

    #[test]
    fn test_scroll_to_bottom_counts_wrapped_lines() {
        let mut app = app_with_greeting(&"a".repeat(100));
        app.chat_width = 40;
        app.chat_height = 2;

        app.scroll_to_bottom();

        // Sender line, three wrapped rows, trailing blank line
        assert_eq!(app.chat_scroll, 3);
    }

    #[test]
    fn test_scroll_to_bottom_clamps_huge_transcript() {
        let mut app = app_with_greeting(&"line\n".repeat(70_000));
        app.chat_width = 40;
        app.chat_height = 10;

        app.scroll_to_bottom();

        assert_eq!(app.chat_scroll, u16::MAX);
    }
}
