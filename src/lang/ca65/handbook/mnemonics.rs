//! 65xx mnemonics known to the scanner and completions.
//!
//! The set covers the 6502 plus the 65C02 extensions, which is what the
//! assembler accepts without a CPU switch.  Keep the table sorted, lookup
//! is by binary search.

pub const MNEMONICS: [&str;66] = [
    "adc","and","asl","bcc","bcs","beq","bit","bmi","bne","bpl","bra","brk",
    "bvc","bvs","clc","cld","cli","clv","cmp","cpx","cpy","dec","dex","dey",
    "eor","inc","inx","iny","jmp","jsr","lda","ldx","ldy","lsr","nop","ora",
    "pha","php","phx","phy","pla","plp","plx","ply","rol","ror","rti","rts",
    "sbc","sec","sed","sei","sta","stp","stx","sty","stz","tax","tay","trb",
    "tsb","tsx","txa","txs","tya","wai"
];

/// case insensitive mnemonic test
pub fn is_mnemonic(txt: &str) -> bool {
    let lower = txt.to_lowercase();
    MNEMONICS.iter().any(|m| *m == lower)
}

/// mnemonics that transfer control and carry a calling entity
pub fn is_call(txt: &str) -> bool {
    let lower = txt.to_lowercase();
    lower == "jsr" || lower == "jmp"
}
