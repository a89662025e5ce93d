use crate::ucf::UcfDirective;

/// Accumulates the text of a UCF file, one line at a time.
#[derive(Debug)]
pub(crate) struct Writer {
    outstring: String,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self {
            /* converted files are small; 1024 bytes is enough that the
            typical output never reallocates more than once */
            outstring: String::with_capacity(1024),
        }
    }

    // add a comment to the output; each line of the text becomes one '#' comment line
    pub(crate) fn add_comment(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.outstring.push('#');
            } else {
                self.outstring.push_str("# ");
                self.outstring.push_str(line);
            }
            self.outstring.push('\n');
        }
    }

    // add one NET directive to the output, terminated with a line break
    pub(crate) fn add_directive(&mut self, directive: &UcfDirective) {
        self.outstring.push_str(&directive.stringify());
        self.outstring.push('\n');
    }

    pub(crate) fn finish(self) -> String {
        self.outstring
    }
}
