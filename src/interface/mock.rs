//! Interfaz simulada para las pruebas del driver
//!
//! Registra todas las transacciones y permite precargar el contenido de los
//! registros de cada chip.

use super::Interface;
use embedded_hal::delay::DelayNs;
use std::collections::{HashMap, HashSet};
use std::vec::Vec;

/// Transacción registrada por el mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Open,
    Write { addr: u8, reg: u8, data: Vec<u8> },
    Read { addr: u8, reg: u8, len: usize },
}

/// Error que devuelve el mock cuando se inyecta un fallo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

#[derive(Debug, Default)]
pub struct MockInterface {
    registers: HashMap<(u8, u8), u8>,
    transactions: Vec<Transaction>,
    failing_reads: HashSet<(u8, u8)>,
    failing_writes: HashSet<(u8, u8)>,
    fail_open: bool,
}

impl MockInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fija el valor de un registro
    pub fn set_reg(&mut self, addr: u8, reg: u8, value: u8) {
        self.registers.insert((addr, reg), value);
    }

    /// Fija varios registros consecutivos a partir de `reg`
    pub fn set_regs(&mut self, addr: u8, reg: u8, values: &[u8]) {
        for (i, value) in values.iter().enumerate() {
            self.set_reg(addr, reg + i as u8, *value);
        }
    }

    pub fn reg(&self, addr: u8, reg: u8) -> Option<u8> {
        self.registers.get(&(addr, reg)).copied()
    }

    pub fn fail_read(&mut self, addr: u8, reg: u8) {
        self.failing_reads.insert((addr, reg));
    }

    pub fn fail_write(&mut self, addr: u8, reg: u8) {
        self.failing_writes.insert((addr, reg));
    }

    pub fn fail_open(&mut self) {
        self.fail_open = true;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    /// Escrituras registradas, en orden, como (dirección, registro, valor)
    pub fn writes(&self) -> Vec<(u8, u8, u8)> {
        self.transactions
            .iter()
            .filter_map(|t| match t {
                Transaction::Write { addr, reg, data } => Some((*addr, *reg, data[0])),
                _ => None,
            })
            .collect()
    }

    /// Lecturas registradas, en orden, como (dirección, registro)
    pub fn reads(&self) -> Vec<(u8, u8)> {
        self.transactions
            .iter()
            .filter_map(|t| match t {
                Transaction::Read { addr, reg, .. } => Some((*addr, *reg)),
                _ => None,
            })
            .collect()
    }
}

impl Interface for MockInterface {
    type Error = MockError;

    fn open(&mut self) -> Result<(), Self::Error> {
        self.transactions.push(Transaction::Open);
        if self.fail_open {
            return Err(MockError);
        }
        Ok(())
    }

    fn write_reg(&mut self, addr: u8, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.transactions.push(Transaction::Write {
            addr,
            reg,
            data: data.to_vec(),
        });
        if self.failing_writes.contains(&(addr, reg)) {
            return Err(MockError);
        }
        self.set_regs(addr, reg, data);
        Ok(())
    }

    fn read_reg(&mut self, addr: u8, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.transactions.push(Transaction::Read {
            addr,
            reg,
            len: data.len(),
        });
        if self.failing_reads.contains(&(addr, reg)) {
            return Err(MockError);
        }
        for (i, byte) in data.iter_mut().enumerate() {
            // Los registros no precargados no responden
            *byte = self.reg(addr, reg + i as u8).ok_or(MockError)?;
        }
        Ok(())
    }
}

/// Retardo que no espera, acumula el tiempo pedido
#[derive(Debug, Default)]
pub struct NoopDelay {
    pub total_ns: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}
